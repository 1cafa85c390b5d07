//! The seam between the session logic and whatever renders audio.

use basedrop::Shared;
use binaural_engine::AudioEngineHandle;
use binaural_render::OfflineRenderer;
use binaural_transport::{AudioBuffer, Command, Status};
use rtrb::Consumer;

/// A running render graph that accepts commands.
pub trait AudioOutput {
    fn sample_rate(&self) -> u32;

    /// Output time in seconds.
    fn current_time(&mut self) -> f64;

    /// Service the output once per display frame, whether or not anything
    /// else needs it this frame.
    fn poll(&mut self) {}

    /// Commit a graph change at the current output time.
    fn send(&mut self, command: Command);

    /// Wrap a buffer so it can be handed to the render thread.
    fn share(&self, buffer: AudioBuffer) -> Shared<AudioBuffer>;
}

/// Acquires an output on first use.
pub trait OutputProvider {
    type Output: AudioOutput;

    fn acquire(&mut self) -> anyhow::Result<Self::Output>;
}

impl<F, O> OutputProvider for F
where
    F: FnMut() -> anyhow::Result<O>,
    O: AudioOutput,
{
    type Output = O;

    fn acquire(&mut self) -> anyhow::Result<O> {
        self()
    }
}

/// Output time as last reported by the audio callback.
///
/// The callback drops clocks while the status ring is full, so the ring has
/// to be drained every frame for the reported time to stay current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusClock {
    frame: u64,
    sample_rate: u32,
}

impl StatusClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frame: 0,
            sample_rate,
        }
    }

    /// Take every pending status, keeping the newest clock.
    pub fn drain(&mut self, status: &mut Consumer<Status>) {
        while let Ok(message) = status.pop() {
            match message {
                Status::Clock { frame } => self.frame = frame,
            }
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn seconds(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// The default device, driven by the cpal engine.
pub struct LiveOutput {
    engine: AudioEngineHandle,
    clock: StatusClock,
}

impl LiveOutput {
    pub fn open() -> anyhow::Result<Self> {
        let engine = binaural_engine::start()?;
        let clock = StatusClock::new(engine.sample_rate);
        Ok(Self { engine, clock })
    }
}

impl AudioOutput for LiveOutput {
    fn sample_rate(&self) -> u32 {
        self.engine.sample_rate
    }

    fn current_time(&mut self) -> f64 {
        self.clock.drain(&mut self.engine.status);
        self.clock.seconds()
    }

    fn poll(&mut self) {
        self.clock.drain(&mut self.engine.status);
        self.engine.collector.collect();
    }

    fn send(&mut self, command: Command) {
        if let Err(rtrb::PushError::Full(command)) = self.engine.commands.push(command) {
            tracing::warn!(?command, "command queue full, dropping");
        }
        self.engine.collector.collect();
    }

    fn share(&self, buffer: AudioBuffer) -> Shared<AudioBuffer> {
        Shared::new(&self.engine.handle, buffer)
    }
}

impl AudioOutput for OfflineRenderer {
    fn sample_rate(&self) -> u32 {
        self.renderer().sample_rate()
    }

    fn current_time(&mut self) -> f64 {
        self.renderer().current_time()
    }

    fn send(&mut self, command: Command) {
        self.apply(command);
    }

    fn share(&self, buffer: AudioBuffer) -> Shared<AudioBuffer> {
        Shared::new(self.handle(), buffer)
    }
}
