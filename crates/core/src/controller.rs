//! Session lifecycle and control propagation.

use std::time::Instant;

use anyhow::Context;

use crate::controls::{ControlInput, Controls, ParameterChange};
use crate::noise::NoiseSynthesizer;
use crate::output::{AudioOutput, OutputProvider};
use crate::pan_lfo::PanLfo;
use crate::session::Session;
use crate::timer::ElapsedTimer;
use crate::tone::ToneGraph;

/// Owns the session and every per-session node, and turns control input
/// into graph changes.
///
/// All methods run on one thread. Nothing blocks; graph changes are
/// committed at the output's current time before the method returns.
pub struct AudioSessionController<P: OutputProvider> {
    provider: P,
    output: Option<P::Output>,
    controls: Controls,
    session: Option<Session>,
    tones: ToneGraph,
    noise: NoiseSynthesizer,
    pan_lfo: PanLfo,
    timer: ElapsedTimer,
}

impl<P: OutputProvider> AudioSessionController<P> {
    pub fn new(provider: P, controls: Controls) -> Self {
        Self {
            provider,
            output: None,
            controls,
            session: None,
            tones: ToneGraph::new(),
            noise: NoiseSynthesizer::new(),
            pan_lfo: PanLfo::new(),
            timer: ElapsedTimer::new(),
        }
    }

    /// Replace the noise synthesizer, e.g. with a seeded one.
    pub fn with_noise(mut self, noise: NoiseSynthesizer) -> Self {
        self.noise = noise;
        self
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.is_playing)
    }

    /// The output, once acquired. It is kept for the controller's lifetime.
    pub fn output(&self) -> Option<&P::Output> {
        self.output.as_ref()
    }

    pub fn output_mut(&mut self) -> Option<&mut P::Output> {
        self.output.as_mut()
    }

    pub fn tone_graph(&self) -> &ToneGraph {
        &self.tones
    }

    pub fn noise(&self) -> &NoiseSynthesizer {
        &self.noise
    }

    pub fn pan_lfo(&self) -> &PanLfo {
        &self.pan_lfo
    }

    pub fn elapsed_display(&self) -> &str {
        self.timer.display()
    }

    /// Start command. Acquires the output on first use, then builds the
    /// session graph. No-op while already playing.
    pub fn handle_start(&mut self, now: Instant) -> anyhow::Result<()> {
        if self.is_playing() {
            tracing::debug!("start ignored, already playing");
            return Ok(());
        }

        if self.output.is_none() {
            let output = self
                .provider
                .acquire()
                .context("failed to acquire audio output")?;
            tracing::info!(sample_rate = output.sample_rate(), "audio output acquired");
            self.output = Some(output);
        }
        let Some(output) = self.output.as_mut() else {
            return Ok(());
        };

        let session = Session::begin(now);
        self.tones.start(output, &self.controls.tone);
        if self.controls.noise.noise_type.is_active() {
            self.noise.start(output, &self.controls.noise);
            if self.controls.noise.pan_enabled {
                self.pan_lfo.start(output);
            }
        }
        self.timer.start(session.started_at);
        self.session = Some(session);
        tracing::info!("session started");
        Ok(())
    }

    /// Stop command. Tears the whole session graph down. No-op while stopped.
    pub fn handle_stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.is_playing = false;

        if let Some(output) = self.output.as_mut() {
            self.pan_lfo.stop(output);
            self.tones.stop(output);
            self.noise.stop(output);
        }
        self.timer.stop();
        tracing::info!(playing = session.is_playing, "session stopped");
    }

    /// Cache the new value; while playing, also commit it to the graph.
    pub fn handle_parameter_change(&mut self, change: ParameterChange) {
        self.controls.apply(change);
        if !self.is_playing() {
            tracing::debug!(?change, "cached for next start");
            return;
        }
        let Some(output) = self.output.as_mut() else {
            return;
        };

        match change {
            ParameterChange::BaseFrequency(_)
            | ParameterChange::BeatFrequency(_)
            | ParameterChange::Volume(_) => self.tones.update(output, &self.controls.tone),
            ParameterChange::NoiseVolume(volume) => self.noise.set_volume(output, volume),
            ParameterChange::NoiseType(noise_type) if noise_type.is_active() => {
                self.noise.start(output, &self.controls.noise);
                if self.controls.noise.pan_enabled {
                    if self.pan_lfo.is_active() {
                        // Carry the sweep over to the new source without waiting a frame.
                        self.pan_lfo.tick(output);
                    } else {
                        self.pan_lfo.start(output);
                    }
                }
            }
            ParameterChange::NoiseType(_) => {
                self.pan_lfo.stop(output);
                self.noise.stop(output);
            }
        }
    }

    /// Cache the toggle; it takes effect now only while noise is playing.
    pub fn handle_pan_toggle(&mut self, enabled: bool) {
        self.controls.noise.pan_enabled = enabled;
        if !self.is_playing() || !self.noise.is_active() {
            tracing::debug!(enabled, "pan toggle cached");
            return;
        }
        let Some(output) = self.output.as_mut() else {
            return;
        };

        if enabled {
            if !self.pan_lfo.is_active() {
                self.noise.attach_panner(output);
                self.pan_lfo.start(output);
            }
        } else {
            self.pan_lfo.stop(output);
            self.noise.panner_released();
        }
    }

    pub fn handle_input(&mut self, input: ControlInput) {
        match input {
            ControlInput::Parameter(change) => self.handle_parameter_change(change),
            ControlInput::PanToggle(enabled) => self.handle_pan_toggle(enabled),
        }
    }

    /// Once per display frame: services the output, runs the pan sweep and
    /// refreshes the elapsed time. Returns true when the elapsed-time text
    /// changed.
    pub fn on_frame(&mut self, now: Instant) -> bool {
        if let Some(output) = self.output.as_mut() {
            output.poll();
            self.pan_lfo.on_frame(output);
        }
        self.timer.poll(now)
    }
}
