//! Error types for the engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur at the engine's boundaries.
///
/// Nothing a driver does mid-run is an error: cancellation is reported
/// through [`crate::Cancelled`] and a missing search target is an
/// [`crate::Outcome::NotFound`].
#[derive(Debug, Error)]
pub enum Error {
    /// The requested algorithm id is not in the catalog.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A configuration value could not be parsed or is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A run was requested outside of a tokio runtime.
    #[error("no tokio runtime available to start a run")]
    NoRuntime,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
