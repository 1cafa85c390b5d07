//! Offline rendering: drives the render graph on the calling thread and
//! bounces the result to WAV.

use std::path::Path;

use basedrop::{Collector, Handle, Shared};
use binaural_engine::Renderer;
use binaural_transport::{AudioBuffer, Command};

const CHANNELS: u16 = 2;

/// A render graph whose clock only moves when `advance` is called.
///
/// Commands are applied the moment they are sent, at the current output
/// time. Rendered frames are kept when recording is on.
pub struct OfflineRenderer {
    renderer: Renderer,
    collector: Collector,
    handle: Handle,
    target_time: f64,
    recorded: Option<Vec<f32>>,
}

impl OfflineRenderer {
    pub fn new(sample_rate: u32) -> Self {
        let collector = Collector::new();
        let handle = collector.handle();
        Self {
            renderer: Renderer::new(sample_rate),
            collector,
            handle,
            target_time: 0.0,
            recorded: None,
        }
    }

    /// Like `new`, but keeps every rendered stereo frame.
    pub fn recording(sample_rate: u32) -> Self {
        Self {
            recorded: Some(Vec::new()),
            ..Self::new(sample_rate)
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.renderer.sample_rate()
    }

    pub fn current_time(&self) -> f64 {
        self.renderer.current_time()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn share(&self, buffer: AudioBuffer) -> Shared<AudioBuffer> {
        Shared::new(&self.handle, buffer)
    }

    pub fn apply(&mut self, command: Command) {
        self.renderer.apply(command);
        self.collector.collect();
    }

    /// Render forward by `seconds` of output time.
    ///
    /// The target frame is derived from the accumulated requested time, so
    /// steps that are not a whole number of frames do not drift.
    pub fn advance(&mut self, seconds: f64) {
        let sample_rate = self.renderer.sample_rate() as f64;
        self.target_time += seconds.max(0.0);
        let target = (self.target_time * sample_rate).round() as u64;
        let frames = target.saturating_sub(self.renderer.frame()) as usize;
        if frames == 0 {
            return;
        }

        match self.recorded.as_mut() {
            Some(recorded) => {
                let start = recorded.len();
                recorded.resize(start + frames * CHANNELS as usize, 0.0);
                self.renderer
                    .render(&mut recorded[start..], CHANNELS as usize);
            }
            None => {
                for _ in 0..frames {
                    self.renderer.next_frame();
                }
            }
        }
        self.collector.collect();
    }

    /// Everything recorded so far as a stereo buffer.
    pub fn to_buffer(&self) -> AudioBuffer {
        AudioBuffer {
            samples: self.recorded.clone().unwrap_or_default(),
            sample_rate: self.renderer.sample_rate(),
            channels: CHANNELS,
        }
    }
}

pub fn write_wav(buffer: &AudioBuffer, path: &Path) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: buffer.channels,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;

    for &sample in &buffer.samples {
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    tracing::info!(
        path = %path.display(),
        seconds = buffer.duration_secs(),
        "wrote wav"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_advance_does_not_drift() {
        // 1/60 s is 133.33 frames at 8 kHz.
        let mut offline = OfflineRenderer::new(8000);
        for _ in 0..600 {
            offline.advance(1.0 / 60.0);
        }
        assert_eq!(offline.renderer().frame(), 80000);
        assert_abs_diff_eq!(offline.current_time(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_recording_captures_stereo_frames() {
        let mut offline = OfflineRenderer::recording(1000);
        offline.apply(Command::StartTones {
            left_hz: 250.0,
            right_hz: 250.0,
            gain: 1.0,
        });
        offline.advance(0.1);

        let buffer = offline.to_buffer();
        assert_eq!(buffer.channels, 2);
        assert_eq!(buffer.frames(), 100);
        // Frame 1 is a quarter cycle into the 250 Hz tone.
        assert_abs_diff_eq!(buffer.samples[2], 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(buffer.samples[3], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_write_wav_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bounce.wav");

        let mut offline = OfflineRenderer::recording(8000);
        offline.apply(Command::StartNoise {
            buffer: offline.share(AudioBuffer::mono(vec![0.25, -0.25], 8000)),
            gain: 1.0,
            pan: Some(-1.0),
        });
        offline.advance(0.5);
        write_wav(&offline.to_buffer(), &path).expect("write wav");

        let mut reader = hound::WavReader::open(&path).expect("open wav");
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 8000);

        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.expect("sample")).collect();
        assert_eq!(samples.len(), 8000);
        assert_eq!(samples[..4], [0.25, 0.0, -0.25, 0.0]);
    }
}
