//! Core library for the sound meter.
//!
//! The centrepiece is [`SumProcessor`], a pass-through processor that runs on
//! the real-time rendering thread and reports the summed absolute amplitude
//! of every quantum to the control thread. Around it sit the pieces a host
//! needs to drive it: a write-once processor registry, a one-way message
//! channel, a small offline worklet host and the control-side level meter.

pub mod config;
pub mod dsp;
pub mod error;
pub mod host;
pub mod message;
pub mod meter;
pub mod processor;
pub mod quantum;
pub mod registry;
pub mod router;

pub use config::{AppConfig, AudioConfig, MeterConfig};
pub use dsp::AmplitudeMetric;
pub use error::{Result, SoundMeterError};
pub use host::{AudioWorkletNode, NodeState};
pub use message::{message_channel, ChannelPort, ControlReceiver, MessagePort, MetricEmitter, SumMessage};
pub use meter::{LevelMeter, LevelReading, WaveformTrace};
pub use processor::{AudioWorkletProcessor, ProcessorOptions, SumProcessor, SUM_PROCESSOR_NAME};
pub use quantum::{AudioBus, ParameterValues, RENDER_QUANTUM_FRAMES};
pub use registry::{ProcessorFactory, ProcessorRegistry};
pub use router::Route;
