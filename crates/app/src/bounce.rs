//! Offline bounce to WAV.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use binaural_core::{AudioBuffer, AudioSessionController, Controls, OfflineRenderer, write_wav};

/// Output time advanced per simulated display frame.
pub const FRAME_SECS: f64 = 1.0 / 60.0;

/// Play a session for `seconds` against the offline renderer and return the
/// recorded stereo audio. The pan sweep is serviced once per frame, as live.
pub fn render_session(
    controls: Controls,
    seconds: f64,
    sample_rate: u32,
) -> anyhow::Result<AudioBuffer> {
    let provider = move || Ok::<_, anyhow::Error>(OfflineRenderer::recording(sample_rate));
    let mut controller = AudioSessionController::new(provider, controls);

    let mut now = Instant::now();
    controller.handle_start(now)?;

    let frames = (seconds.max(0.0) / FRAME_SECS).round() as u64;
    let frame = Duration::from_secs_f64(FRAME_SECS);
    for _ in 0..frames {
        if let Some(output) = controller.output_mut() {
            output.advance(FRAME_SECS);
        }
        now += frame;
        if controller.on_frame(now) {
            tracing::debug!(elapsed = controller.elapsed_display(), "rendering");
        }
    }
    controller.handle_stop();

    let output = controller
        .output()
        .context("offline output was never acquired")?;
    Ok(output.to_buffer())
}

pub fn bounce(controls: Controls, path: &Path, seconds: f64, sample_rate: u32) -> anyhow::Result<()> {
    tracing::info!(seconds, sample_rate, "rendering offline");
    let buffer = render_session(controls, seconds, sample_rate)?;
    write_wav(&buffer, path)
}
