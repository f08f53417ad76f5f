//! # Error Types
//!
//! Errors raised by the typed manifest layer. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Schema violations are not represented here: they belong to
//! `modlist-schema`, which reports every violation with its JSON Pointer
//! path. Errors in this crate describe a single failing value.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the typed manifest layer.
#[derive(Error, Debug)]
pub enum ModlistError {
    /// A mod `source` is not an absolute URI.
    #[error("invalid source URI {uri:?}: {reason}")]
    InvalidSourceUri {
        /// The rejected input.
        uri: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error while reading or writing a manifest file.
    #[error("io error at {path:?}: {source}")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        /// Underlying IO failure.
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for ModlistError {
    fn from(err: serde_json::Error) -> Self {
        ModlistError::Serialization(err.to_string())
    }
}
