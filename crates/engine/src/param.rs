//! Automatable scalar parameter.

#[derive(Debug, Clone, Copy)]
struct Ramp {
    from: f32,
    to: f32,
    elapsed: u32,
    total: u32,
}

/// A node parameter that is either held at a value or ramping linearly
/// towards a target, one step per rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    value: f32,
    ramp: Option<Ramp>,
}

impl Param {
    pub fn new(value: f32) -> Self {
        Self { value, ramp: None }
    }

    /// Commit `value` immediately, cancelling any ramp in flight.
    pub fn set(&mut self, value: f32) {
        self.value = value;
        self.ramp = None;
    }

    /// Start a linear ramp from the current value to `target` over `frames`.
    pub fn ramp_to(&mut self, target: f32, frames: u32) {
        if frames == 0 {
            self.set(target);
            return;
        }
        self.ramp = Some(Ramp {
            from: self.value,
            to: target,
            elapsed: 0,
            total: frames,
        });
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }

    /// Value for the next frame.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if let Some(ramp) = self.ramp.as_mut() {
            ramp.elapsed += 1;
            if ramp.elapsed >= ramp.total {
                self.value = ramp.to;
                self.ramp = None;
            } else {
                let t = ramp.elapsed as f32 / ramp.total as f32;
                self.value = ramp.from + (ramp.to - ramp.from) * t;
            }
        }
        self.value
    }
}
