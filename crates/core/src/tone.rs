use binaural_transport::{Command, ToneParameters};

use crate::output::AudioOutput;

/// Values last committed to the tone pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneNodes {
    pub left_hz: f32,
    pub right_hz: f32,
    pub gain: f32,
}

impl ToneNodes {
    fn from_params(params: &ToneParameters) -> Self {
        Self {
            left_hz: params.left_hz(),
            right_hz: params.right_hz(),
            gain: params.volume,
        }
    }
}

/// The two detuned generators, their fixed hard-left/hard-right panners and
/// the shared volume stage.
#[derive(Debug, Default)]
pub struct ToneGraph {
    nodes: Option<ToneNodes>,
}

impl ToneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.nodes.is_some()
    }

    pub fn nodes(&self) -> Option<&ToneNodes> {
        self.nodes.as_ref()
    }

    /// Build the pair and start it. No-op while already running.
    pub fn start<O: AudioOutput>(&mut self, output: &mut O, params: &ToneParameters) {
        if self.nodes.is_some() {
            tracing::debug!("tone graph already running");
            return;
        }

        let nodes = ToneNodes::from_params(params);
        output.send(Command::StartTones {
            left_hz: nodes.left_hz,
            right_hz: nodes.right_hz,
            gain: nodes.gain,
        });
        self.nodes = Some(nodes);
        tracing::info!(
            left_hz = nodes.left_hz,
            right_hz = nodes.right_hz,
            gain = nodes.gain,
            "tones started"
        );
    }

    /// Retune left to the base frequency, right to base + beat, and set the
    /// shared volume. Committed instantly; ignored while stopped.
    pub fn update<O: AudioOutput>(&mut self, output: &mut O, params: &ToneParameters) {
        let Some(current) = self.nodes.as_mut() else {
            return;
        };

        let nodes = ToneNodes::from_params(params);
        output.send(Command::SetToneFrequencies {
            left_hz: nodes.left_hz,
            right_hz: nodes.right_hz,
        });
        output.send(Command::SetToneGain(nodes.gain));
        *current = nodes;
        tracing::debug!(
            left_hz = nodes.left_hz,
            right_hz = nodes.right_hz,
            gain = nodes.gain,
            "tones updated"
        );
    }

    pub fn stop<O: AudioOutput>(&mut self, output: &mut O) {
        if self.nodes.take().is_some() {
            output.send(Command::StopTones);
            tracing::info!("tones stopped");
        }
    }
}
