mod params;

use basedrop::Shared;

pub use params::{NoiseParameters, NoiseType, ParseNoiseTypeError, ToneParameters};

/// Length of every generated noise loop, in seconds.
pub const NOISE_LOOP_SECS: f64 = 2.0;

/// Pan position of the left tone generator.
pub const LEFT_PAN: f32 = -1.0;

/// Pan position of the right tone generator.
pub const RIGHT_PAN: f32 = 1.0;

/// Owned block of interleaved samples.
///
/// Noise loops are mono (`channels == 1`); offline bounces are stereo.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioBuffer {
    /// Create a mono buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use binaural_transport::AudioBuffer;
    ///
    /// let buffer = AudioBuffer::mono(vec![0.0; 48000], 48000);
    /// assert_eq!(buffer.frames(), 48000);
    /// assert_eq!(buffer.duration_secs(), 1.0);
    /// ```
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Iterate over one channel of the interleaved data.
    ///
    /// # Panics
    ///
    /// Panics if `channel` is >= `self.channels`.
    pub fn channel(&self, channel: usize) -> impl Iterator<Item = f32> + '_ {
        assert!(
            channel < self.channels as usize,
            "channel index out of bounds"
        );
        let channels = self.channels as usize;
        (0..self.frames()).map(move |frame| self.samples[frame * channels + channel])
    }
}

/// Messages from the control thread to the render graph.
///
/// Every variant is committed at the output time at which the renderer
/// receives it. The only interpolated change is `ReleaseNoisePanner`.
pub enum Command {
    /// Build the tone pair: left generator at `left_hz` panned hard left,
    /// right generator at `right_hz` panned hard right, both through `gain`.
    StartTones { left_hz: f32, right_hz: f32, gain: f32 },
    SetToneFrequencies { left_hz: f32, right_hz: f32 },
    SetToneGain(f32),
    StopTones,
    /// Build a looping noise source. `pan` is `Some` when the source is
    /// routed through a panner.
    StartNoise {
        buffer: Shared<AudioBuffer>,
        gain: f32,
        pan: Option<f32>,
    },
    SetNoiseGain(f32),
    /// Insert a panner into a running noise source.
    AttachNoisePanner { pan: f32 },
    SetNoisePan(f32),
    /// Ramp the noise pan linearly to centre over `ramp_secs`, then drop the panner.
    ReleaseNoisePanner { ramp_secs: f32 },
    StopNoise,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::StartTones {
                left_hz,
                right_hz,
                gain,
            } => f
                .debug_struct("StartTones")
                .field("left_hz", left_hz)
                .field("right_hz", right_hz)
                .field("gain", gain)
                .finish(),
            Command::SetToneFrequencies { left_hz, right_hz } => f
                .debug_struct("SetToneFrequencies")
                .field("left_hz", left_hz)
                .field("right_hz", right_hz)
                .finish(),
            Command::SetToneGain(gain) => f.debug_tuple("SetToneGain").field(gain).finish(),
            Command::StopTones => f.write_str("StopTones"),
            Command::StartNoise { buffer, gain, pan } => f
                .debug_struct("StartNoise")
                .field("frames", &buffer.frames())
                .field("gain", gain)
                .field("pan", pan)
                .finish(),
            Command::SetNoiseGain(gain) => f.debug_tuple("SetNoiseGain").field(gain).finish(),
            Command::AttachNoisePanner { pan } => f
                .debug_struct("AttachNoisePanner")
                .field("pan", pan)
                .finish(),
            Command::SetNoisePan(pan) => f.debug_tuple("SetNoisePan").field(pan).finish(),
            Command::ReleaseNoisePanner { ramp_secs } => f
                .debug_struct("ReleaseNoisePanner")
                .field("ramp_secs", ramp_secs)
                .finish(),
            Command::StopNoise => f.write_str("StopNoise"),
        }
    }
}

/// Messages from the render graph back to the control thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    /// Frames rendered before the current callback.
    Clock { frame: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_buffer() {
        let buffer = AudioBuffer::mono(vec![0.25; 96000], 48000);

        assert_eq!(buffer.channels, 1);
        assert_eq!(buffer.frames(), 96000);
        assert!(!buffer.is_empty());
        assert!((buffer.duration_secs() - NOISE_LOOP_SECS).abs() < 1e-9);
    }

    #[test]
    fn test_channel_iterator() {
        let buffer = AudioBuffer {
            samples: vec![0.0, 1.0, 0.5, 1.5, 0.25, 1.25],
            sample_rate: 44100,
            channels: 2,
        };

        let left: Vec<f32> = buffer.channel(0).collect();
        assert_eq!(left, vec![0.0, 0.5, 0.25]);

        let right: Vec<f32> = buffer.channel(1).collect();
        assert_eq!(right, vec![1.0, 1.5, 1.25]);
    }

    #[test]
    #[should_panic(expected = "channel index out of bounds")]
    fn test_channel_out_of_bounds() {
        let buffer = AudioBuffer::mono(vec![0.0; 4], 44100);
        let _ = buffer.channel(1).count();
    }

    #[test]
    fn test_command_debug_omits_samples() {
        let collector = basedrop::Collector::new();
        let buffer = Shared::new(
            &collector.handle(),
            AudioBuffer::mono(vec![0.0; 8], 44100),
        );
        let command = Command::StartNoise {
            buffer,
            gain: 0.5,
            pan: None,
        };

        let text = format!("{command:?}");
        assert!(text.contains("frames: 8"));
        assert!(text.contains("gain: 0.5"));
    }
}
