use crate::{
    dsp,
    message::{MessagePort, MetricEmitter, NullPort},
    quantum::{AudioBus, ParameterValues},
    router::{self, Route},
};

/// Identifier the sum processor is registered under.
pub const SUM_PROCESSOR_NAME: &str = "sum-processor";

/// Per-quantum callback invoked by the rendering thread.
///
/// `process` runs against a hard deadline: implementations must not block,
/// lock, or allocate. The return value is the continuation signal; `false`
/// asks the host to tear the node down.
pub trait AudioWorkletProcessor: Send {
    fn process(
        &mut self,
        inputs: &[AudioBus],
        outputs: &mut [AudioBus],
        params: &ParameterValues,
    ) -> bool;
}

/// Construction arguments the host hands to a processor factory.
pub struct ProcessorOptions {
    pub port: Box<dyn MessagePort>,
}

impl ProcessorOptions {
    pub fn new(port: impl MessagePort + 'static) -> Self {
        Self {
            port: Box::new(port),
        }
    }
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self::new(NullPort)
    }
}

impl std::fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorOptions").finish_non_exhaustive()
    }
}

/// Passes channel 0 through unchanged and reports the sum of its absolute
/// sample values once per quantum.
///
/// Holds no state between quanta besides the outbound port. Only channel 0 is
/// metered; other channels are neither copied nor measured.
#[derive(Debug, Default)]
pub struct SumProcessor {
    emitter: MetricEmitter,
}

impl SumProcessor {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            emitter: MetricEmitter::new(options.port),
        }
    }
}

impl AudioWorkletProcessor for SumProcessor {
    fn process(
        &mut self,
        inputs: &[AudioBus],
        outputs: &mut [AudioBus],
        _params: &ParameterValues,
    ) -> bool {
        let (input, output) = match router::route(inputs, outputs) {
            Route::Connected { input, output } => (input, output),
            Route::NoInput | Route::NoOutput => return true,
        };

        dsp::pass_through(input, output);
        let metric = dsp::accumulate_abs(input);
        self.emitter.emit(metric.sum, metric.length);

        true
    }
}

/// Factory registered for [`SUM_PROCESSOR_NAME`].
pub fn create_sum_processor(options: ProcessorOptions) -> Box<dyn AudioWorkletProcessor> {
    Box::new(SumProcessor::new(options))
}
