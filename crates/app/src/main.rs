use std::{f32::consts::TAU, path::PathBuf, thread};

use clap::{Parser, Subcommand, ValueEnum};
use sound_meter_core::{
    message_channel, registry, AppConfig, AudioWorkletNode, ControlReceiver, LevelMeter,
    MeterConfig, NodeState, ProcessorOptions, WaveformTrace, SUM_PROCESSOR_NAME,
};
use tracing_subscriber::EnvFilter;

fn main() -> sound_meter_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            signal,
            frequency,
            amplitude,
            seconds,
            processor,
            config,
            json,
        } => {
            let config = match config {
                Some(path) => AppConfig::load(&path)?,
                None => AppConfig::default(),
            };
            let source = SignalSource {
                kind: signal,
                frequency,
                amplitude,
            };
            run_render(&config, &processor, source, seconds, json)
        }
        Commands::List => {
            for name in registry::init().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_render(
    config: &AppConfig,
    processor: &str,
    source: SignalSource,
    seconds: f32,
    json: bool,
) -> sound_meter_core::Result<()> {
    let audio = &config.audio;
    let (port, receiver) = message_channel();
    let mut node = AudioWorkletNode::new(
        registry::init(),
        processor,
        ProcessorOptions::new(port),
        audio,
    )?;

    let total_frames = (seconds.max(0.0) * audio.sample_rate as f32).round() as usize;
    let quanta = total_frames.div_ceil(audio.quantum_size);
    // Roughly ten meter lines per second.
    let report_every = (audio.sample_rate as usize / audio.quantum_size / 10).max(1);
    tracing::info!(
        processor,
        kind = ?source.kind,
        sample_rate = audio.sample_rate,
        quanta,
        "rendering test signal"
    );

    let meter_config = config.meter.clone();
    let listener = thread::spawn(move || listen(receiver, meter_config, report_every, json));

    let mut block = vec![0.0_f32; audio.quantum_size];
    for quantum in 0..quanta {
        source.fill(&mut block, quantum * audio.quantum_size, audio.sample_rate);
        if node.render(&block) == NodeState::Closed {
            tracing::warn!(
                quantum,
                processor = node.name(),
                "node closed before the signal ended"
            );
            break;
        }
    }
    drop(node);

    let (trace, meter) = listener
        .join()
        .map_err(|_| sound_meter_core::SoundMeterError::msg("control thread panicked"))?;
    tracing::info!(
        points = trace.len(),
        peak = trace.max(),
        held = meter.held(),
        readings = meter.readings(),
        "render finished"
    );
    Ok(())
}

/// Drains metric messages until the rendering side hangs up.
fn listen(
    receiver: ControlReceiver,
    config: MeterConfig,
    report_every: usize,
    json: bool,
) -> (WaveformTrace, LevelMeter) {
    let mut meter = LevelMeter::new(config.clone());
    let mut trace = WaveformTrace::new(config.trace_capacity);

    for (index, message) in receiver.iter().enumerate() {
        let reading = meter.update(&message);
        trace.push(&message);

        if json {
            match serde_json::to_string(&message) {
                Ok(line) => println!("{line}"),
                Err(err) => tracing::error!(%err, "failed to encode message"),
            }
        } else if index % report_every == 0 {
            tracing::info!(
                quantum = index,
                mean = reading.mean_abs,
                dbfs = reading.dbfs,
                held = reading.held,
                "level"
            );
        }
    }

    (trace, meter)
}

#[derive(Debug, Clone, Copy)]
struct SignalSource {
    kind: SignalKind,
    frequency: f32,
    amplitude: f32,
}

impl SignalSource {
    fn fill(&self, block: &mut [f32], start_frame: usize, sample_rate: u32) {
        let rate = sample_rate as f32;
        for (offset, sample) in block.iter_mut().enumerate() {
            let t = (start_frame + offset) as f32 / rate;
            let phase = (t * self.frequency).fract();
            *sample = match self.kind {
                SignalKind::Silence => 0.0,
                SignalKind::Sine => self.amplitude * (TAU * phase).sin(),
                SignalKind::Square if phase < 0.5 => self.amplitude,
                SignalKind::Square => -self.amplitude,
            };
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Pass-through level metering host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a generated signal through a processor and meter its output.
    Render {
        /// Waveform fed into the node.
        #[arg(short, long, value_enum, default_value_t = SignalKind::Sine)]
        signal: SignalKind,
        /// Signal frequency in Hz.
        #[arg(short, long, default_value_t = 440.0)]
        frequency: f32,
        /// Peak amplitude in `[0, 1]`.
        #[arg(short, long, default_value_t = 0.5)]
        amplitude: f32,
        /// Duration to render, in seconds.
        #[arg(long, default_value_t = 1.0)]
        seconds: f32,
        /// Registered processor identifier.
        #[arg(short, long, default_value = SUM_PROCESSOR_NAME)]
        processor: String,
        /// Optional JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print every metric message as a JSON line instead of level logs.
        #[arg(long)]
        json: bool,
    },
    /// List registered processor identifiers.
    List,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SignalKind {
    Sine,
    Square,
    Silence,
}
