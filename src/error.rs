//! Error types for FileCabinet
//!
//! Provides a unified error type for all store, codec and snapshot operations.

use thiserror::Error;

/// Result type alias using CabinetError
pub type Result<T> = std::result::Result<T, CabinetError>;

/// Unified error type for FileCabinet operations
#[derive(Debug, Error)]
pub enum CabinetError {
    // -------------------------------------------------------------------------
    // Caller Errors (recoverable, nothing was mutated)
    // -------------------------------------------------------------------------
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record #{0} is not found")]
    NotFound(i32),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Storage I/O error: {0}")]
    StorageIo(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Snapshot Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CabinetError {
    /// Whether the caller can simply report the error and carry on.
    ///
    /// Recoverable errors are raised before any state is touched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CabinetError::Validation(_)
                | CabinetError::NotFound(_)
                | CabinetError::InvalidOperation(_)
        )
    }
}

impl From<bincode::Error> for CabinetError {
    fn from(err: bincode::Error) -> Self {
        CabinetError::Snapshot(format!("payload serialization failed: {}", err))
    }
}
