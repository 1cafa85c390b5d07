mod bounce;
mod cli;
mod config;
mod repl;

use binaural_core::{AudioSessionController, LiveOutput};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;
use crate::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut controls = Config::load(args.config.as_deref()).controls();
    args.apply_overrides(&mut controls);

    if let Some(path) = &args.render {
        return bounce::bounce(controls, path, args.seconds, args.sample_rate);
    }

    let mut controller = AudioSessionController::new(LiveOutput::open, controls);
    repl::run(&mut controller)
}
