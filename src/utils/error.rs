use thiserror::Error;

/// Main error type for the datatable engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Data source error: {0}")]
    Source(#[from] SourceError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Record source failures. Any of these at startup is fatal.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Data file not found: {0}")]
    NotFound(String),

    #[error("Invalid JSON data: {0}")]
    Malformed(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("I/O failure: {0}")]
    Io(String),
}

/// Single-record lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("User with ID {0} not found")]
    NotFound(i64),

    #[error("Invalid user data for ID {id}: {reason}")]
    InvalidRecord { id: i64, reason: String },
}

/// Request validation errors raised by the request surfaces (HTTP, CLI)
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl RequestError {
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        RequestError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
