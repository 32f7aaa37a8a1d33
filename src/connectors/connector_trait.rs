use async_trait::async_trait;

use crate::utils::{error::EngineResult, types::Record};

/// Kinds of record sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    File,
    Memory,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::File => write!(f, "file"),
            SourceType::Memory => write!(f, "memory"),
        }
    }
}

/// Base trait for anything the record store can be loaded from
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Load every record. Called once at startup; failure is fatal.
    async fn load_all(&self) -> EngineResult<Vec<Record>>;

    /// Get the type of this source
    fn source_type(&self) -> SourceType;

    /// Human-readable location of the data, used in logs
    fn describe(&self) -> String;
}
