//! The render graph: tone pair, noise source, gain and pan stages.
//!
//! The graph owns no threads. `Renderer::apply` mutates it and the
//! `render*` methods pull stereo frames out of it, either from the cpal
//! callback or from an offline driver.

use std::f32::consts::TAU;

use basedrop::Shared;
use binaural_transport::{AudioBuffer, Command, LEFT_PAN, RIGHT_PAN};

use crate::param::Param;

/// Channel gains for a mono source at `pan`.
///
/// Balance law: the side being panned towards stays at unity and the
/// opposite side is attenuated linearly, so centre equals an unpanned
/// source. Pan is clamped to [-1, 1].
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    if pan <= 0.0 {
        (1.0, 1.0 + pan)
    } else {
        (1.0 - pan, 1.0)
    }
}

/// Sine generator with a phase accumulator in cycles.
#[derive(Debug, Clone)]
pub struct Oscillator {
    frequency: Param,
    phase: f32,
}

impl Oscillator {
    pub fn new(frequency_hz: f32) -> Self {
        Self {
            frequency: Param::new(frequency_hz),
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }

    pub fn set_frequency(&mut self, frequency_hz: f32) {
        self.frequency.set(frequency_hz);
    }

    #[inline]
    fn next(&mut self, sample_rate: f32) -> f32 {
        let sample = (self.phase * TAU).sin();
        let hz = self.frequency.next();
        self.phase = (self.phase + hz / sample_rate).rem_euclid(1.0);
        sample
    }
}

/// Two generators panned hard left and right, through one shared gain.
#[derive(Debug, Clone)]
pub struct ToneVoices {
    left: Oscillator,
    right: Oscillator,
    gain: Param,
    left_pan: (f32, f32),
    right_pan: (f32, f32),
}

impl ToneVoices {
    fn new(left_hz: f32, right_hz: f32, gain: f32) -> Self {
        Self {
            left: Oscillator::new(left_hz),
            right: Oscillator::new(right_hz),
            gain: Param::new(gain),
            left_pan: pan_gains(LEFT_PAN),
            right_pan: pan_gains(RIGHT_PAN),
        }
    }

    pub fn left_frequency(&self) -> f32 {
        self.left.frequency()
    }

    pub fn right_frequency(&self) -> f32 {
        self.right.frequency()
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }

    #[inline]
    fn next(&mut self, sample_rate: f32) -> (f32, f32) {
        let left = self.left.next(sample_rate);
        let right = self.right.next(sample_rate);
        let gain = self.gain.next();
        (
            (left * self.left_pan.0 + right * self.right_pan.0) * gain,
            (left * self.left_pan.1 + right * self.right_pan.1) * gain,
        )
    }
}

#[derive(Debug, Clone)]
struct NoisePanner {
    pan: Param,
    releasing: bool,
}

/// Looping mono buffer source feeding its own gain and an optional panner.
pub struct NoiseVoice {
    buffer: Shared<AudioBuffer>,
    position: usize,
    gain: Param,
    panner: Option<NoisePanner>,
}

impl NoiseVoice {
    fn new(buffer: Shared<AudioBuffer>, gain: f32, pan: Option<f32>) -> Self {
        Self {
            buffer,
            position: 0,
            gain: Param::new(gain),
            panner: pan.map(|pan| NoisePanner {
                pan: Param::new(pan),
                releasing: false,
            }),
        }
    }

    pub fn buffer(&self) -> &AudioBuffer {
        &self.buffer
    }

    /// Read position within the loop, in frames.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn gain(&self) -> f32 {
        self.gain.value()
    }

    /// Current pan position, `None` when the source is not routed through a panner.
    pub fn pan(&self) -> Option<f32> {
        self.panner.as_ref().map(|panner| panner.pan.value())
    }

    pub fn is_releasing(&self) -> bool {
        self.panner.as_ref().is_some_and(|panner| panner.releasing)
    }

    #[inline]
    fn next(&mut self) -> (f32, f32) {
        let frames = self.buffer.frames();
        let sample = if frames == 0 {
            0.0
        } else {
            let sample = self.buffer.samples[self.position * self.buffer.channels as usize];
            self.position = (self.position + 1) % frames;
            sample
        };
        let sample = sample * self.gain.next();

        let Some(panner) = self.panner.as_mut() else {
            return (sample, sample);
        };
        let (left, right) = pan_gains(panner.pan.next());
        if panner.releasing && !panner.pan.is_ramping() {
            self.panner = None;
        }
        (sample * left, sample * right)
    }
}

/// The complete graph plus the output sample clock.
pub struct Renderer {
    sample_rate: u32,
    frame: u64,
    tones: Option<ToneVoices>,
    noise: Option<NoiseVoice>,
}

impl Renderer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            frame: 0,
            tones: None,
            noise: None,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Output time in seconds.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn tones(&self) -> Option<&ToneVoices> {
        self.tones.as_ref()
    }

    pub fn noise(&self) -> Option<&NoiseVoice> {
        self.noise.as_ref()
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::StartTones {
                left_hz,
                right_hz,
                gain,
            } => {
                self.tones = Some(ToneVoices::new(left_hz, right_hz, gain));
            }
            Command::SetToneFrequencies { left_hz, right_hz } => {
                if let Some(tones) = self.tones.as_mut() {
                    tones.left.set_frequency(left_hz);
                    tones.right.set_frequency(right_hz);
                }
            }
            Command::SetToneGain(gain) => {
                if let Some(tones) = self.tones.as_mut() {
                    tones.gain.set(gain);
                }
            }
            Command::StopTones => self.tones = None,
            Command::StartNoise { buffer, gain, pan } => {
                self.noise = Some(NoiseVoice::new(buffer, gain, pan));
            }
            Command::SetNoiseGain(gain) => {
                if let Some(noise) = self.noise.as_mut() {
                    noise.gain.set(gain);
                }
            }
            Command::AttachNoisePanner { pan } => {
                if let Some(noise) = self.noise.as_mut() {
                    noise.panner = Some(NoisePanner {
                        pan: Param::new(pan),
                        releasing: false,
                    });
                }
            }
            Command::SetNoisePan(pan) => {
                if let Some(panner) = self.noise.as_mut().and_then(|n| n.panner.as_mut()) {
                    panner.pan.set(pan);
                }
            }
            Command::ReleaseNoisePanner { ramp_secs } => {
                let frames = (ramp_secs.max(0.0) * self.sample_rate as f32).round() as u32;
                if let Some(noise) = self.noise.as_mut() {
                    if frames == 0 {
                        noise.panner = None;
                    } else if let Some(panner) = noise.panner.as_mut() {
                        panner.pan.ramp_to(0.0, frames);
                        panner.releasing = true;
                    }
                }
            }
            Command::StopNoise => self.noise = None,
        }
    }

    /// Pull one stereo frame and advance the clock.
    #[inline]
    pub fn next_frame(&mut self) -> (f32, f32) {
        let sample_rate = self.sample_rate as f32;
        let (mut left, mut right) = (0.0, 0.0);

        if let Some(tones) = self.tones.as_mut() {
            let (l, r) = tones.next(sample_rate);
            left += l;
            right += r;
        }
        if let Some(noise) = self.noise.as_mut() {
            let (l, r) = noise.next();
            left += l;
            right += r;
        }

        self.frame += 1;
        (left, right)
    }

    /// Fill interleaved `data` with `channels` channels per frame, converting
    /// each sample with `convert`. Mono outputs get the average of both sides;
    /// channels past the second are silent.
    pub fn render_with<T, F>(&mut self, data: &mut [T], channels: usize, convert: F)
    where
        T: Copy,
        F: Fn(f32) -> T,
    {
        for frame in data.chunks_mut(channels.max(1)) {
            let (left, right) = self.next_frame();
            match frame {
                [mono] => *mono = convert((left + right) * 0.5),
                [l, r, rest @ ..] => {
                    *l = convert(left);
                    *r = convert(right);
                    for sample in rest {
                        *sample = convert(0.0);
                    }
                }
                [] => {}
            }
        }
    }

    pub fn render(&mut self, data: &mut [f32], channels: usize) {
        self.render_with(data, channels, |sample| sample);
    }
}
