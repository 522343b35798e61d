//! Minimal offline worklet host.
//!
//! Owns one processor and its pre-allocated buses, feeds it a quantum at a
//! time and enforces the teardown rules: a processor that returns `false` or
//! panics is closed and never called again.

use std::panic::{self, AssertUnwindSafe};

use crate::{
    config::AudioConfig,
    processor::{AudioWorkletProcessor, ProcessorOptions},
    quantum::{AudioBus, ParameterValues},
    registry::ProcessorRegistry,
    Result,
};

/// Lifecycle of a node from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Running,
    Closed,
}

pub struct AudioWorkletNode {
    name: String,
    processor: Option<Box<dyn AudioWorkletProcessor>>,
    inputs: Vec<AudioBus>,
    outputs: Vec<AudioBus>,
    /// Input bus kept aside while the input is disconnected.
    parked_input: Option<AudioBus>,
    params: ParameterValues,
    quanta_rendered: u64,
}

impl AudioWorkletNode {
    /// Instantiates `name` from `registry` with buses shaped by `config`.
    pub fn new(
        registry: &ProcessorRegistry,
        name: &str,
        options: ProcessorOptions,
        config: &AudioConfig,
    ) -> Result<Self> {
        config.validate()?;
        let processor = registry.instantiate(name, options)?;
        tracing::debug!(
            processor = name,
            channels = config.channel_count,
            frames = config.quantum_size,
            "created worklet node"
        );

        Ok(Self {
            name: name.to_string(),
            processor: Some(processor),
            inputs: vec![AudioBus::new(config.channel_count, config.quantum_size)],
            outputs: vec![AudioBus::new(config.channel_count, config.quantum_size)],
            parked_input: None,
            params: ParameterValues::new(),
            quanta_rendered: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> NodeState {
        if self.processor.is_some() {
            NodeState::Running
        } else {
            NodeState::Closed
        }
    }

    pub fn quanta_rendered(&self) -> u64 {
        self.quanta_rendered
    }

    pub fn is_input_connected(&self) -> bool {
        self.parked_input.is_none()
    }

    /// Presents an empty input group to the processor from now on.
    pub fn disconnect_input(&mut self) {
        if self.parked_input.is_none() {
            self.parked_input = Some(std::mem::take(&mut self.inputs[0]));
        }
    }

    pub fn connect_input(&mut self) {
        if let Some(bus) = self.parked_input.take() {
            self.inputs[0] = bus;
        }
    }

    /// Output bus as left by the last rendered quantum.
    pub fn output(&self) -> &AudioBus {
        &self.outputs[0]
    }

    /// Renders one quantum with `block` as the source signal.
    ///
    /// `block` is copied into every input channel, zero padded or truncated
    /// to the quantum size. Outputs are cleared before the processor runs.
    pub fn render(&mut self, block: &[f32]) -> NodeState {
        self.silence_outputs();

        let Some(processor) = self.processor.as_mut() else {
            return NodeState::Closed;
        };

        if self.parked_input.is_none() {
            load_block(&mut self.inputs[0], block);
        }

        let inputs = &self.inputs;
        let outputs = &mut self.outputs;
        let params = &self.params;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            processor.process(inputs, outputs, params)
        }));
        self.quanta_rendered += 1;

        match outcome {
            Ok(true) => NodeState::Running,
            Ok(false) => {
                tracing::warn!(processor = %self.name, "processor requested teardown");
                self.silence_outputs();
                self.close()
            }
            Err(_) => {
                tracing::warn!(
                    processor = %self.name,
                    quantum = self.quanta_rendered,
                    "processor panicked, closing node"
                );
                self.silence_outputs();
                self.close()
            }
        }
    }

    fn silence_outputs(&mut self) {
        for bus in &mut self.outputs {
            bus.silence();
        }
    }

    fn close(&mut self) -> NodeState {
        self.processor = None;
        NodeState::Closed
    }
}

impl std::fmt::Debug for AudioWorkletNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioWorkletNode")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("input_connected", &self.is_input_connected())
            .field("quanta_rendered", &self.quanta_rendered)
            .finish()
    }
}

fn load_block(bus: &mut AudioBus, block: &[f32]) {
    for index in 0..bus.channel_count() {
        if let Some(channel) = bus.channel_mut(index) {
            let len = channel.len().min(block.len());
            channel[..len].copy_from_slice(&block[..len]);
            channel[len..].fill(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::{message_channel, SumMessage},
        processor::SUM_PROCESSOR_NAME,
    };

    struct OneShot;

    impl AudioWorkletProcessor for OneShot {
        fn process(&mut self, _: &[AudioBus], outputs: &mut [AudioBus], _: &ParameterValues) -> bool {
            if let Some(channel) = outputs[0].channel_mut(0) {
                channel.fill(0.75);
            }
            false
        }
    }

    struct Faulty;

    impl AudioWorkletProcessor for Faulty {
        fn process(&mut self, _: &[AudioBus], outputs: &mut [AudioBus], _: &ParameterValues) -> bool {
            if let Some(channel) = outputs[0].channel_mut(0) {
                channel.fill(1.0);
            }
            panic!("processor fault");
        }
    }

    fn config(frames: usize) -> AudioConfig {
        AudioConfig {
            quantum_size: frames,
            ..AudioConfig::default()
        }
    }

    fn registry() -> ProcessorRegistry {
        let mut registry = ProcessorRegistry::with_builtins();
        registry
            .register("one-shot", |_| Box::new(OneShot) as Box<dyn AudioWorkletProcessor>)
            .unwrap();
        registry
            .register("faulty", |_| Box::new(Faulty) as Box<dyn AudioWorkletProcessor>)
            .unwrap();
        registry
    }

    #[test]
    fn renders_through_sum_processor() {
        let (port, receiver) = message_channel();
        let mut node = AudioWorkletNode::new(
            &registry(),
            SUM_PROCESSOR_NAME,
            ProcessorOptions::new(port),
            &config(4),
        )
        .unwrap();

        assert_eq!(node.render(&[0.5, -0.25, 0.0, 1.0]), NodeState::Running);
        assert_eq!(node.output().channel(0).unwrap(), &[0.5, -0.25, 0.0, 1.0]);
        assert_eq!(receiver.drain(), vec![SumMessage { sum: 1.75, length: 4 }]);
    }

    #[test]
    fn short_blocks_are_zero_padded() {
        let (port, receiver) = message_channel();
        let mut node = AudioWorkletNode::new(
            &registry(),
            SUM_PROCESSOR_NAME,
            ProcessorOptions::new(port),
            &config(4),
        )
        .unwrap();

        node.render(&[1.0, 1.0, 1.0, 1.0]);
        node.render(&[-0.5]);

        assert_eq!(node.output().channel(0).unwrap(), &[-0.5, 0.0, 0.0, 0.0]);
        let messages = receiver.drain();
        assert_eq!(messages[1], SumMessage { sum: 0.5, length: 4 });
    }

    #[test]
    fn disconnected_input_stays_idle() {
        let (port, receiver) = message_channel();
        let mut node = AudioWorkletNode::new(
            &registry(),
            SUM_PROCESSOR_NAME,
            ProcessorOptions::new(port),
            &config(4),
        )
        .unwrap();

        node.disconnect_input();
        assert_eq!(node.render(&[1.0; 4]), NodeState::Running);
        assert!(receiver.drain().is_empty());
        assert_eq!(node.output().channel(0).unwrap(), &[0.0; 4]);

        node.connect_input();
        node.render(&[1.0; 4]);
        assert_eq!(receiver.drain(), vec![SumMessage { sum: 4.0, length: 4 }]);
    }

    #[test]
    fn false_continuation_closes_node() {
        let mut node =
            AudioWorkletNode::new(&registry(), "one-shot", ProcessorOptions::default(), &config(4))
                .unwrap();

        assert_eq!(node.name(), "one-shot");
        assert_eq!(node.render(&[0.0; 4]), NodeState::Closed);
        assert_eq!(node.output().channel(0).unwrap(), &[0.0; 4]);
        assert_eq!(node.render(&[0.0; 4]), NodeState::Closed);
        assert_eq!(node.output().channel(0).unwrap(), &[0.0; 4]);
        assert_eq!(node.quanta_rendered(), 1);
    }

    #[test]
    fn panicking_processor_is_contained() {
        let mut node =
            AudioWorkletNode::new(&registry(), "faulty", ProcessorOptions::default(), &config(4))
                .unwrap();

        assert_eq!(node.render(&[0.0; 4]), NodeState::Closed);
        assert_eq!(node.state(), NodeState::Closed);
        assert_eq!(node.output().channel(0).unwrap(), &[0.0; 4]);
    }

    #[test]
    fn unknown_processor_fails_to_build() {
        let err = AudioWorkletNode::new(
            &registry(),
            "nope",
            ProcessorOptions::default(),
            &AudioConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err}").contains("nope"));
    }
}
