//! Error types for the NVS emulator
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::record::ValueKind;

/// Result type alias using NvsError
pub type Result<T> = std::result::Result<T, NvsError>;

/// Unified error type for NVS operations
#[derive(Debug, Error)]
pub enum NvsError {
    // -------------------------------------------------------------------------
    // Input Validation Errors
    // -------------------------------------------------------------------------
    #[error("Key must not be empty")]
    EmptyKey,

    #[error("Key too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("String value too long: {len} bytes (max {max})")]
    ValueTooLong { len: usize, max: usize },

    #[error("Invalid string value: {0}")]
    InvalidValue(String),

    // -------------------------------------------------------------------------
    // Table Errors
    // -------------------------------------------------------------------------
    #[error("Record table full ({capacity} slots)")]
    TableFull { capacity: usize },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Key has been deleted: {0}")]
    KeyDeleted(String),

    // -------------------------------------------------------------------------
    // I/O and Integrity Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted record: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of an [`NvsError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller supplied a malformed key or value
    InputValidation,
    /// No free slot left in the record table
    Capacity,
    /// Key is absent from the table
    NotFound,
    /// Key exists with a different value kind
    TypeMismatch,
    /// Key exists but is tombstoned
    State,
    /// Backing file could not be opened, read or written
    Io,
    /// Record failed its checksum or could not be decoded
    Integrity,
    /// Invalid store configuration
    Config,
}

impl NvsError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NvsError::EmptyKey
            | NvsError::KeyTooLong { .. }
            | NvsError::InvalidKey(_)
            | NvsError::ValueTooLong { .. }
            | NvsError::InvalidValue(_) => ErrorKind::InputValidation,
            NvsError::TableFull { .. } => ErrorKind::Capacity,
            NvsError::KeyNotFound(_) => ErrorKind::NotFound,
            NvsError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            NvsError::KeyDeleted(_) => ErrorKind::State,
            NvsError::Io(_) => ErrorKind::Io,
            NvsError::Corruption(_) => ErrorKind::Integrity,
            NvsError::Config(_) => ErrorKind::Config,
        }
    }
}
