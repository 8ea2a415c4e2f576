use thiserror::Error;

#[derive(Debug, Error)]
pub enum StabilityError {
    /// The remote service answered with a non-200 status.
    #[error("Generation failed ({status}): {detail}")]
    GenerationFailed {
        status: u16,
        detail: serde_json::Value,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StabilityError {
    /// Builds a `GenerationFailed` from a raw error body, keeping it as a JSON
    /// string when the service did not send JSON.
    pub fn generation_failed(status: u16, body: &[u8]) -> Self {
        let detail = serde_json::from_slice(body)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into()));
        StabilityError::GenerationFailed { status, detail }
    }
}

pub type Result<T> = std::result::Result<T, StabilityError>;
