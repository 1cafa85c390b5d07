//! Colored-noise loops.
//!
//! `pink` and `brown` share one leaky one-pole recurrence. The result is a
//! brownian-style lowpass, not spectrally true pink noise, and the two types
//! are deliberately identical.

use binaural_transport::{AudioBuffer, Command, NOISE_LOOP_SECS, NoiseParameters, NoiseType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::output::AudioOutput;

const INPUT_GAIN: f32 = 0.02;
const LEAK_DIVISOR: f32 = 1.02;
const MAKEUP_GAIN: f32 = 3.5;

/// Running state of the pink/brown recurrence.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub last_out: f32,
}

impl FilterState {
    #[inline]
    pub fn next(&mut self, white: f32) -> f32 {
        self.last_out = (self.last_out + INPUT_GAIN * white) / LEAK_DIVISOR;
        self.last_out * MAKEUP_GAIN
    }
}

/// One white sample, uniform in [-1, 1).
#[inline]
pub fn white_sample<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.r#gen::<f32>() * 2.0 - 1.0
}

/// Fill `duration_secs * sample_rate` samples of `noise_type`, running the
/// recurrence from `filter`. `NoiseType::None` yields silence.
pub fn generate<R: Rng + ?Sized>(
    noise_type: NoiseType,
    duration_secs: f64,
    sample_rate: u32,
    filter: &mut FilterState,
    rng: &mut R,
) -> Vec<f32> {
    let frames = (sample_rate as f64 * duration_secs) as usize;
    match noise_type {
        NoiseType::None => vec![0.0; frames],
        NoiseType::White => (0..frames).map(|_| white_sample(rng)).collect(),
        NoiseType::Pink | NoiseType::Brown => (0..frames)
            .map(|_| filter.next(white_sample(rng)))
            .collect(),
    }
}

/// Handle to the looping source currently in the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseNode {
    pub noise_type: NoiseType,
    pub frames: usize,
    pub panned: bool,
}

/// Owns the noise subgraph: one looping source, its gain, and the optional
/// panner stage.
pub struct NoiseSynthesizer {
    rng: StdRng,
    node: Option<NoiseNode>,
}

impl NoiseSynthesizer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic white source, for reproducible loops.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng, node: None }
    }

    pub fn node(&self) -> Option<&NoiseNode> {
        self.node.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.node.is_some()
    }

    /// Generate a loop with a fresh filter state.
    pub fn generate(&mut self, noise_type: NoiseType, duration_secs: f64, sample_rate: u32) -> Vec<f32> {
        let mut filter = FilterState::default();
        generate(noise_type, duration_secs, sample_rate, &mut filter, &mut self.rng)
    }

    /// Build a new looping source for `params` and start it. A source that
    /// is already playing is replaced, so every call starts from a fresh
    /// filter state. With panning enabled the source goes through a panner
    /// held at centre until the pan LFO drives it.
    pub fn start<O: AudioOutput>(&mut self, output: &mut O, params: &NoiseParameters) {
        self.stop(output);
        if !params.noise_type.is_active() {
            return;
        }

        let sample_rate = output.sample_rate();
        let samples = self.generate(params.noise_type, NOISE_LOOP_SECS, sample_rate);
        let frames = samples.len();
        let buffer = output.share(AudioBuffer::mono(samples, sample_rate));
        let pan = params.pan_enabled.then_some(0.0);

        output.send(Command::StartNoise {
            buffer,
            gain: params.volume,
            pan,
        });
        self.node = Some(NoiseNode {
            noise_type: params.noise_type,
            frames,
            panned: params.pan_enabled,
        });
        tracing::info!(
            noise = %params.noise_type,
            volume = params.volume,
            panned = params.pan_enabled,
            "noise started"
        );
    }

    pub fn set_volume<O: AudioOutput>(&mut self, output: &mut O, volume: f32) {
        if self.node.is_some() {
            output.send(Command::SetNoiseGain(volume));
            tracing::debug!(volume, "noise volume");
        }
    }

    /// Route the running source through a panner at centre.
    pub fn attach_panner<O: AudioOutput>(&mut self, output: &mut O) {
        if let Some(node) = self.node.as_mut() {
            output.send(Command::AttachNoisePanner { pan: 0.0 });
            node.panned = true;
        }
    }

    /// The panner is on its way out (the pan LFO ramps and releases it).
    pub fn panner_released(&mut self) {
        if let Some(node) = self.node.as_mut() {
            node.panned = false;
        }
    }

    pub fn stop<O: AudioOutput>(&mut self, output: &mut O) {
        if let Some(node) = self.node.take() {
            output.send(Command::StopNoise);
            tracing::info!(noise = %node.noise_type, "noise stopped");
        }
    }
}

impl Default for NoiseSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use binaural_render::OfflineRenderer;

    const SR: u32 = 8000;

    fn pink(volume: f32, pan_enabled: bool) -> NoiseParameters {
        NoiseParameters {
            noise_type: NoiseType::Pink,
            volume,
            pan_enabled,
        }
    }

    #[test]
    fn test_white_is_uniform_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        let samples = generate(NoiseType::White, 1.0, SR, &mut FilterState::default(), &mut rng);

        assert_eq!(samples.len(), SR as usize);
        assert!(samples.iter().all(|&s| (-1.0..1.0).contains(&s)));
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        assert!(mean.abs() < 0.05);
        assert!(samples.iter().any(|&s| s < -0.9));
        assert!(samples.iter().any(|&s| s > 0.9));
    }

    #[test]
    fn test_pink_follows_recurrence() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = generate(NoiseType::Pink, 0.1, SR, &mut FilterState::default(), &mut rng);

        let mut reference = StdRng::seed_from_u64(42);
        let mut last_out = 0.0f32;
        for &sample in &samples {
            let white = reference.r#gen::<f32>() * 2.0 - 1.0;
            last_out = (last_out + 0.02 * white) / 1.02;
            assert_eq!(sample, last_out * 3.5);
        }
    }

    #[test]
    fn test_pink_and_brown_are_identical() {
        let pink = generate(
            NoiseType::Pink,
            0.5,
            SR,
            &mut FilterState::default(),
            &mut StdRng::seed_from_u64(9),
        );
        let brown = generate(
            NoiseType::Brown,
            0.5,
            SR,
            &mut FilterState::default(),
            &mut StdRng::seed_from_u64(9),
        );
        assert_eq!(pink, brown);
    }

    #[test]
    fn test_filter_state_carries_between_calls() {
        let mut filter = FilterState::default();
        let mut rng = StdRng::seed_from_u64(3);
        let first = generate(NoiseType::Brown, 0.01, SR, &mut filter, &mut rng);
        let carried = filter;
        assert_eq!(carried.last_out * 3.5, *first.last().unwrap());

        let mut fresh = FilterState::default();
        assert_eq!(fresh.next(1.0), 0.02 / 1.02 * 3.5);
    }

    #[test]
    fn test_none_is_silence() {
        let samples = generate(
            NoiseType::None,
            0.5,
            SR,
            &mut FilterState::default(),
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(samples.len(), 4000);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_start_builds_two_second_loop() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(5);
        noise.start(&mut output, &pink(0.3, false));

        let node = noise.node().copied().expect("node");
        assert_eq!(node.noise_type, NoiseType::Pink);
        assert_eq!(node.frames, 2 * SR as usize);

        let voice = output.renderer().noise().expect("voice");
        assert_eq!(voice.buffer().frames(), 2 * SR as usize);
        assert_eq!(voice.gain(), 0.3);
        assert_eq!(voice.pan(), None);

        let expected = NoiseSynthesizer::seeded(5).generate(NoiseType::Pink, 2.0, SR);
        assert_eq!(voice.buffer().samples, expected);
    }

    #[test]
    fn test_start_with_pan_enabled_adds_centred_panner() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(5);
        noise.start(&mut output, &pink(0.5, true));

        assert!(noise.node().is_some_and(|n| n.panned));
        assert_eq!(output.renderer().noise().and_then(|n| n.pan()), Some(0.0));
    }

    #[test]
    fn test_restart_uses_fresh_filter_state() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(11);
        noise.start(&mut output, &pink(0.5, false));
        output.advance(0.25);
        noise.start(&mut output, &pink(0.5, false));

        let voice = output.renderer().noise().expect("voice");
        assert_eq!(voice.position(), 0);
        // A fresh recurrence starts from zero, so its first sample is tiny.
        assert!(voice.buffer().samples[0].abs() <= 0.02 / 1.02 * 3.5);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(1);
        noise.start(&mut output, &pink(0.5, false));
        noise.stop(&mut output);
        noise.stop(&mut output);

        assert!(!noise.is_active());
        assert!(output.renderer().noise().is_none());
    }

    #[test]
    fn test_start_with_none_tears_down() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(1);
        noise.start(&mut output, &pink(0.5, false));
        noise.start(
            &mut output,
            &NoiseParameters {
                noise_type: NoiseType::None,
                ..pink(0.5, false)
            },
        );

        assert!(!noise.is_active());
        assert!(output.renderer().noise().is_none());
    }

    #[test]
    fn test_set_volume_commits_to_gain() {
        let mut output = OfflineRenderer::new(SR);
        let mut noise = NoiseSynthesizer::seeded(1);
        noise.set_volume(&mut output, 0.9);
        assert!(output.renderer().noise().is_none());

        noise.start(&mut output, &pink(0.5, false));
        noise.set_volume(&mut output, 0.1);
        assert_abs_diff_eq!(output.renderer().noise().unwrap().gain(), 0.1);
    }
}
