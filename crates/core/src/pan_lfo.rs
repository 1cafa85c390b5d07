//! Slow triangular sweep of the noise pan position.

use binaural_transport::Command;

use crate::output::AudioOutput;
use crate::schedule::FrameTask;

/// One full left-right-left sweep.
pub const PAN_LFO_PERIOD_SECS: f64 = 60.0;

/// Length of the return-to-centre ramp when the sweep stops.
pub const PAN_RELEASE_SECS: f32 = 0.5;

/// Position within the sweep, in [0, 1).
pub fn cycle_position(elapsed_secs: f64) -> f64 {
    (elapsed_secs / PAN_LFO_PERIOD_SECS).rem_euclid(1.0)
}

/// Triangle wave: -1 at 0, 0 at 0.25, +1 at 0.5, 0 at 0.75, back to -1 at 1.
pub fn triangle_pan(cycle_position: f64) -> f32 {
    let c = cycle_position.rem_euclid(1.0);
    let pan = if c < 0.25 {
        -1.0 + 4.0 * c
    } else if c < 0.5 {
        4.0 * (c - 0.25)
    } else if c < 0.75 {
        1.0 - 4.0 * (c - 0.5)
    } else {
        -4.0 * (c - 0.75)
    };
    pan as f32
}

/// Exists only while the sweep is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    /// Output time the sweep is measured from.
    pub phase_origin_time: f64,
    /// Last value committed to the panner, if a tick has run.
    pub last_value: Option<f32>,
}

#[derive(Debug, Default)]
pub struct PanLfo {
    state: Option<PanState>,
    task: FrameTask,
}

impl PanLfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&PanState> {
        self.state.as_ref()
    }

    /// Inactive -> Active. The first recomputation runs on the next frame.
    pub fn start<O: AudioOutput>(&mut self, output: &mut O) {
        if self.state.is_some() {
            return;
        }
        let phase_origin_time = output.current_time();
        self.state = Some(PanState {
            phase_origin_time,
            last_value: None,
        });
        self.task.arm();
        tracing::debug!(phase_origin_time, "pan lfo started");
    }

    /// Per-frame entry point. Runs `tick` while the recomputation is scheduled.
    pub fn on_frame<O: AudioOutput>(&mut self, output: &mut O) -> Option<f32> {
        if !self.task.fire() {
            return None;
        }
        self.tick(output)
    }

    /// Recompute the pan position for the current output time and commit it.
    pub fn tick<O: AudioOutput>(&mut self, output: &mut O) -> Option<f32> {
        let state = self.state.as_mut()?;
        let elapsed = output.current_time() - state.phase_origin_time;
        let pan = triangle_pan(cycle_position(elapsed));
        output.send(Command::SetNoisePan(pan));
        state.last_value = Some(pan);
        Some(pan)
    }

    /// Active -> Inactive. Cancels the recomputation, then ramps the panner
    /// linearly back to centre and lets the graph release it.
    pub fn stop<O: AudioOutput>(&mut self, output: &mut O) {
        let Some(state) = self.state.take() else {
            return;
        };
        self.task.cancel();
        output.send(Command::ReleaseNoisePanner {
            ramp_secs: PAN_RELEASE_SECS,
        });
        tracing::debug!(last_value = ?state.last_value, "pan lfo stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use binaural_render::OfflineRenderer;
    use binaural_transport::AudioBuffer;

    const SR: u32 = 6000;

    fn panned_noise(output: &mut OfflineRenderer) {
        let buffer = output.share(AudioBuffer::mono(vec![1.0; 64], SR));
        output.apply(Command::StartNoise {
            buffer,
            gain: 1.0,
            pan: Some(0.0),
        });
    }

    #[test]
    fn test_triangle_breakpoints() {
        assert_eq!(triangle_pan(0.0), -1.0);
        assert_eq!(triangle_pan(0.125), -0.5);
        assert_eq!(triangle_pan(0.25), 0.0);
        assert_eq!(triangle_pan(0.5), 1.0);
        assert_eq!(triangle_pan(0.75), 0.0);
        assert_eq!(triangle_pan(0.875), -0.5);
        assert_abs_diff_eq!(triangle_pan(0.999_999), -1.0, epsilon = 1e-4);
        assert_eq!(triangle_pan(1.0), -1.0);
    }

    #[test]
    fn test_triangle_is_continuous() {
        let mut previous = triangle_pan(0.0);
        for step in 1..=1000 {
            let pan = triangle_pan(step as f64 / 1000.0);
            assert!((pan - previous).abs() <= 0.004 + 1e-6);
            previous = pan;
        }
    }

    #[test]
    fn test_cycle_position_period() {
        assert_eq!(cycle_position(0.0), 0.0);
        assert_eq!(cycle_position(15.0), 0.25);
        assert_eq!(cycle_position(30.0), 0.5);
        assert_eq!(cycle_position(60.0), 0.0);
        assert_eq!(cycle_position(90.0), 0.5);
    }

    #[test]
    fn test_inactive_lfo_does_nothing() {
        let mut output = OfflineRenderer::new(SR);
        panned_noise(&mut output);
        let mut lfo = PanLfo::new();

        assert_eq!(lfo.on_frame(&mut output), None);
        assert_eq!(lfo.tick(&mut output), None);
        lfo.stop(&mut output);
        assert_eq!(output.renderer().noise().and_then(|n| n.pan()), Some(0.0));
        assert!(!output.renderer().noise().unwrap().is_releasing());
    }

    #[test]
    fn test_ticks_follow_output_time() {
        let mut output = OfflineRenderer::new(SR);
        panned_noise(&mut output);
        output.advance(5.0);

        let mut lfo = PanLfo::new();
        lfo.start(&mut output);
        assert_eq!(lfo.state().map(|s| s.phase_origin_time), Some(5.0));

        assert_eq!(lfo.on_frame(&mut output), Some(-1.0));
        output.advance(15.0);
        assert_eq!(lfo.on_frame(&mut output), Some(0.0));
        output.advance(15.0);
        assert_eq!(lfo.on_frame(&mut output), Some(1.0));
        assert_eq!(output.renderer().noise().and_then(|n| n.pan()), Some(1.0));
        assert_eq!(lfo.state().and_then(|s| s.last_value), Some(1.0));
    }

    #[test]
    fn test_start_twice_keeps_origin() {
        let mut output = OfflineRenderer::new(SR);
        let mut lfo = PanLfo::new();
        lfo.start(&mut output);
        output.advance(2.0);
        lfo.start(&mut output);

        assert_eq!(lfo.state().map(|s| s.phase_origin_time), Some(0.0));
    }

    #[test]
    fn test_stop_cancels_and_ramps_to_centre() {
        let mut output = OfflineRenderer::new(SR);
        panned_noise(&mut output);
        let mut lfo = PanLfo::new();
        lfo.start(&mut output);
        output.advance(30.0);
        assert_eq!(lfo.on_frame(&mut output), Some(1.0));

        lfo.stop(&mut output);
        assert!(!lfo.is_active());
        assert!(output.renderer().noise().unwrap().is_releasing());

        output.advance(0.25);
        assert_eq!(lfo.on_frame(&mut output), None);
        let pan = output.renderer().noise().and_then(|n| n.pan()).unwrap();
        assert_abs_diff_eq!(pan, 0.5, epsilon = 1e-3);

        output.advance(0.25);
        assert_eq!(output.renderer().noise().and_then(|n| n.pan()), None);

        lfo.stop(&mut output);
        assert!(!lfo.is_active());
    }
}
