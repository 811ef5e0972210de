//! Error types for schedstore
//!
//! Units of work declare their own error type and the storage facade passes it
//! through untouched. The errors defined here cover the facade's own
//! infrastructure: configuration files and backup images.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use thiserror::Error;

/// Result type alias for facade infrastructure operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Infrastructure errors raised by the storage facade itself
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error (config files, backup files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backup image written by an incompatible format version
    #[error("Unsupported backup format: expected {expected}, found {found}")]
    BackupFormat {
        /// Format version this build understands
        expected: u32,
        /// Format version found in the image
        found: u32,
    },
}

impl StorageError {
    /// Build a configuration error from any displayable message
    pub fn config(msg: impl Into<String>) -> Self {
        StorageError::Config(msg.into())
    }

    /// Build a serialization error from any displayable message
    pub fn serialization(msg: impl Into<String>) -> Self {
        StorageError::Serialization(msg.into())
    }
}
