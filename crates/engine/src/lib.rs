mod graph;
mod param;

use basedrop::{Collector, Handle};
use cpal::{
    FromSample, SizedSample,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use binaural_transport::{Command, Status};

pub use graph::{NoiseVoice, Oscillator, Renderer, ToneVoices, pan_gains};
pub use param::Param;

const COMMAND_CAPACITY: usize = 256;
const STATUS_CAPACITY: usize = 64;

pub struct AudioEngineHandle {
    pub commands: rtrb::Producer<Command>,
    pub status: rtrb::Consumer<Status>,
    pub collector: Collector,
    pub handle: Handle,
    pub sample_rate: u32,
    _stream: cpal::Stream,
}

/// Open the default output device and start an empty render graph on it.
pub fn start() -> anyhow::Result<AudioEngineHandle> {
    let collector = Collector::new();
    let handle = collector.handle();

    let (command_tx, command_rx) = rtrb::RingBuffer::<Command>::new(COMMAND_CAPACITY);
    let (status_tx, status_rx) = rtrb::RingBuffer::<Status>::new(STATUS_CAPACITY);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("no output device found"))?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels();

    tracing::info!(
        device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
        sample_rate,
        channels,
        format = ?config.sample_format(),
        "opening audio output"
    );

    let renderer = Renderer::new(sample_rate);
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => {
            build_stream::<f32>(&device, &config.into(), renderer, command_rx, status_tx)?
        }
        cpal::SampleFormat::I16 => {
            build_stream::<i16>(&device, &config.into(), renderer, command_rx, status_tx)?
        }
        sample_format => anyhow::bail!("unsupported sample format '{sample_format}'"),
    };

    stream.play()?;

    Ok(AudioEngineHandle {
        commands: command_tx,
        status: status_rx,
        collector,
        handle,
        sample_rate,
        _stream: stream,
    })
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut renderer: Renderer,
    mut command_rx: rtrb::Consumer<Command>,
    mut status_tx: rtrb::Producer<Status>,
) -> anyhow::Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let output_channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            while let Ok(cmd) = command_rx.pop() {
                renderer.apply(cmd);
            }

            let _ = status_tx.push(Status::Clock {
                frame: renderer.frame(),
            });

            renderer.render_with(data, output_channels, |sample| T::from_sample(sample));
        },
        |err| tracing::error!("stream error: {err}"),
        None,
    )?;

    Ok(stream)
}
