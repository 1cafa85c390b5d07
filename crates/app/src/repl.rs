//! Interactive host loop: stdin commands in, elapsed time out.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use binaural_core::{AudioSessionController, ControlError, ControlInput, OutputProvider};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub const HELP: &str = "commands: start | stop | set <control> <value> | pan on|off | status | quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    Start,
    Stop,
    Control(ControlInput),
    Status,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum HostCommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Control(#[from] ControlError),
}

impl FromStr for HostCommand {
    type Err = HostCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(HostCommandError::Usage(HELP));
        };
        let rest: Vec<&str> = words.collect();

        match (command.to_ascii_lowercase().as_str(), rest.as_slice()) {
            ("start" | "play", []) => Ok(HostCommand::Start),
            ("stop", []) => Ok(HostCommand::Stop),
            ("status", []) => Ok(HostCommand::Status),
            ("help" | "?", []) => Ok(HostCommand::Help),
            ("quit" | "exit", []) => Ok(HostCommand::Quit),
            ("set", [control, value]) => {
                Ok(HostCommand::Control(ControlInput::parse(control, value)?))
            }
            ("set", _) => Err(HostCommandError::Usage("set <control> <value>")),
            ("pan", [value]) => Ok(HostCommand::Control(ControlInput::parse("pan", value)?)),
            ("pan", _) => Err(HostCommandError::Usage("pan on|off")),
            _ => Err(HostCommandError::Unknown(line.trim().to_string())),
        }
    }
}

fn spawn_stdin_reader() -> anyhow::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn stdin reader")?;
    Ok(rx)
}

fn status_line<P: OutputProvider>(controller: &AudioSessionController<P>) -> String {
    let controls = controller.controls();
    format!(
        "{} {} | left {} Hz right {} Hz vol {:.0}% | noise {} {:.0}% pan {}",
        if controller.is_playing() { "playing" } else { "stopped" },
        controller.elapsed_display(),
        controls.tone.left_hz(),
        controls.tone.right_hz(),
        controls.tone.volume * 100.0,
        controls.noise.noise_type,
        controls.noise.volume * 100.0,
        if controls.noise.pan_enabled { "on" } else { "off" },
    )
}

/// Apply one command. Returns false when the loop should exit.
pub fn dispatch<P: OutputProvider>(
    controller: &mut AudioSessionController<P>,
    command: HostCommand,
    now: Instant,
) -> bool {
    match command {
        HostCommand::Start => {
            if let Err(err) = controller.handle_start(now) {
                tracing::error!("{err:#}");
            }
        }
        HostCommand::Stop => controller.handle_stop(),
        HostCommand::Control(input) => controller.handle_input(input),
        HostCommand::Status => println!("{}", status_line(controller)),
        HostCommand::Help => println!("{HELP}"),
        HostCommand::Quit => return false,
    }
    true
}

/// Runs until `quit` or end of input. All controller calls happen on this
/// thread; stdin is read on a helper thread.
pub fn run<P: OutputProvider>(controller: &mut AudioSessionController<P>) -> anyhow::Result<()> {
    let lines = spawn_stdin_reader()?;
    println!("{HELP}");

    'host: loop {
        loop {
            match lines.try_recv() {
                Ok(line) if line.trim().is_empty() => {}
                Ok(line) => match line.parse::<HostCommand>() {
                    Ok(command) => {
                        if !dispatch(controller, command, Instant::now()) {
                            break 'host;
                        }
                    }
                    Err(err) => tracing::warn!("{err}"),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'host,
            }
        }

        if controller.on_frame(Instant::now()) {
            println!("{}", controller.elapsed_display());
        }
        thread::sleep(FRAME_INTERVAL);
    }

    controller.handle_stop();
    Ok(())
}
