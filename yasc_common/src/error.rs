//! Error types shared by the engine and the card host.
//!
//! `ConfigError` is the only failure a host ever sees from the engine. It is
//! raised while a configuration object is normalised and rejects that
//! configuration outright. `YascError` is the wider error used by host shells
//! that also read files and parse JSON.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Rejection of a widget configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither `symbol` nor a non-blank entry in `symbols` was given.
    #[error("You need to define a stock symbol")]
    MissingSymbol,

    /// The refresh interval could not be interpreted as seconds.
    #[error("Invalid update interval: {0}")]
    InvalidInterval(String),

    /// A display name edit pointed past the configured symbols.
    #[error("No symbol at position {index} (configured: {len})")]
    DisplayNameIndex {
        /// Requested position.
        index: usize,
        /// Number of configured symbols.
        len: usize,
    },
}

/// A chart was requested for a quote without usable price samples.
///
/// Not a failure of the widget: renderers substitute a placeholder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("No chart data")]
pub struct NoDataAvailable;

/// Unified error type for host shells.
#[derive(Error, Debug)]
pub enum YascError {
    /// I/O error while reading configuration or ticker files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Configuration was rejected.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error while parsing a ticker list into symbols.
    #[error("Parse tickers file error: {0}")]
    ParseTickersFile(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// A poisoned mutex was encountered around the quote store.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for YascError {
    fn from(err: PoisonError<T>) -> Self {
        YascError::MutexLock(err.to_string())
    }
}
