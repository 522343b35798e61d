/// Result alias that carries the custom [`SoundMeterError`] type.
pub type Result<T> = std::result::Result<T, SoundMeterError>;

/// Common error type for the core crate.
///
/// None of these are produced on the rendering thread; they surface from
/// registration, configuration and host setup only.
#[derive(Debug, thiserror::Error)]
pub enum SoundMeterError {
    /// Free-form error used by the application layer.
    #[error("{0}")]
    Message(String),
    /// A processor was registered without an identifier.
    #[error("processor name must not be empty")]
    EmptyProcessorName,
    /// A processor identifier was registered twice.
    #[error("processor `{0}` is already registered")]
    DuplicateProcessor(String),
    /// The host asked for an identifier nobody registered.
    #[error("no processor registered under `{0}`")]
    UnknownProcessor(String),
    /// The process-wide registry was already installed.
    #[error("processor registry has already been installed")]
    RegistryInstalled,
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// Wrapper around JSON (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl SoundMeterError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for SoundMeterError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for SoundMeterError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
