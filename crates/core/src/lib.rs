pub mod controller;
pub mod controls;
pub mod noise;
pub mod output;
pub mod pan_lfo;
pub mod schedule;
pub mod session;
pub mod timer;
pub mod tone;

pub use controller::AudioSessionController;
pub use controls::{ControlError, ControlId, ControlInput, Controls, ParameterChange};
pub use noise::{FilterState, NoiseNode, NoiseSynthesizer};
pub use output::{AudioOutput, LiveOutput, OutputProvider, StatusClock};
pub use pan_lfo::{PAN_LFO_PERIOD_SECS, PAN_RELEASE_SECS, PanLfo, PanState};
pub use session::Session;
pub use timer::{ElapsedTimer, RESET_DISPLAY, format_elapsed};
pub use tone::{ToneGraph, ToneNodes};

pub use binaural_render::{OfflineRenderer, write_wav};
pub use binaural_transport::{AudioBuffer, NoiseParameters, NoiseType, ToneParameters};
