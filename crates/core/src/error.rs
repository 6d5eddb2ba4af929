/// Result alias that carries the custom [`CognifyError`] type.
pub type Result<T> = std::result::Result<T, CognifyError>;

/// Common error type for the core crate.
///
/// Only ingestion, configuration and audio start-up are fallible. Playback
/// operations clamp or degrade to no-ops instead of returning errors.
#[derive(Debug, thiserror::Error)]
pub enum CognifyError {
    /// Free-form message, mostly surfaced by the command line front end.
    #[error("{0}")]
    Message(String),
    /// Input that can never be turned into a usable dataset or config.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The requested subject or metric does not exist in the dataset.
    #[error("unknown {kind} `{name}`")]
    UnknownSelection { kind: &'static str, name: String },
    /// The audio backend refused to start.
    #[error("audio unavailable: {0}")]
    AudioUnavailable(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("config: {0}")]
    Json(#[from] serde_json::Error),
}

impl CognifyError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for CognifyError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for CognifyError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
