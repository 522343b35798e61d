//! Identifier → factory table the host consults when it instantiates a node.

use std::{collections::BTreeMap, sync::OnceLock};

use crate::{
    processor::{create_sum_processor, AudioWorkletProcessor, ProcessorOptions, SUM_PROCESSOR_NAME},
    Result, SoundMeterError,
};

/// Produces a fresh processor for every node the host creates.
pub type ProcessorFactory =
    Box<dyn Fn(ProcessorOptions) -> Box<dyn AudioWorkletProcessor> + Send + Sync>;

static GLOBAL: OnceLock<ProcessorRegistry> = OnceLock::new();

/// Write-once association of processor identifiers with their factories.
#[derive(Default)]
pub struct ProcessorRegistry {
    factories: BTreeMap<String, ProcessorFactory>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with every processor this crate ships.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert(SUM_PROCESSOR_NAME.to_string(), Box::new(create_sum_processor));
        registry
    }

    /// Adds `factory` under `name`. Entries can never be replaced.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(ProcessorOptions) -> Box<dyn AudioWorkletProcessor> + Send + Sync + 'static,
    {
        if name.is_empty() {
            return Err(SoundMeterError::EmptyProcessorName);
        }
        if self.factories.contains_key(name) {
            return Err(SoundMeterError::DuplicateProcessor(name.to_string()));
        }

        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered identifiers in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn instantiate(
        &self,
        name: &str,
        options: ProcessorOptions,
    ) -> Result<Box<dyn AudioWorkletProcessor>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SoundMeterError::UnknownProcessor(name.to_string()))?;
        Ok(factory(options))
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Publishes `registry` for the rest of the process. Succeeds only once.
pub fn install_global(registry: ProcessorRegistry) -> Result<&'static ProcessorRegistry> {
    let names: Vec<String> = registry.names().map(str::to_string).collect();
    GLOBAL
        .set(registry)
        .map_err(|_| SoundMeterError::RegistryInstalled)?;
    tracing::debug!(?names, "installed processor registry");
    global().ok_or(SoundMeterError::RegistryInstalled)
}

/// Returns the installed registry, if any.
pub fn global() -> Option<&'static ProcessorRegistry> {
    GLOBAL.get()
}

/// Installs the built-in registry on first use and returns it.
pub fn init() -> &'static ProcessorRegistry {
    GLOBAL.get_or_init(|| {
        tracing::debug!("installing built-in processor registry");
        ProcessorRegistry::with_builtins()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::SumProcessor;

    #[test]
    fn builtins_include_sum_processor() {
        let registry = ProcessorRegistry::with_builtins();

        assert!(registry.contains(SUM_PROCESSOR_NAME));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["sum-processor"]);
        assert!(registry
            .instantiate(SUM_PROCESSOR_NAME, ProcessorOptions::default())
            .is_ok());
    }

    #[test]
    fn rejects_duplicates_and_empty_names() {
        let mut registry = ProcessorRegistry::with_builtins();

        let err = registry
            .register(SUM_PROCESSOR_NAME, create_sum_processor)
            .unwrap_err();
        assert!(matches!(err, SoundMeterError::DuplicateProcessor(_)));

        let err = registry.register("", create_sum_processor).unwrap_err();
        assert!(matches!(err, SoundMeterError::EmptyProcessorName));
    }

    #[test]
    fn registers_custom_factories() {
        let mut registry = ProcessorRegistry::new();
        registry
            .register("meter", |options| {
                Box::new(SumProcessor::new(options)) as Box<dyn AudioWorkletProcessor>
            })
            .unwrap();

        assert!(registry.contains("meter"));
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let registry = ProcessorRegistry::new();
        let err = registry
            .instantiate("missing", ProcessorOptions::default())
            .err()
            .expect("instantiating an unknown identifier should fail");
        assert!(format!("{err}").contains("missing"));
    }

    #[test]
    fn global_registry_is_write_once() {
        let first = init();
        assert!(first.contains(SUM_PROCESSOR_NAME));
        assert!(std::ptr::eq(first, init()));

        let err = install_global(ProcessorRegistry::new()).unwrap_err();
        assert!(matches!(err, SoundMeterError::RegistryInstalled));
    }
}
