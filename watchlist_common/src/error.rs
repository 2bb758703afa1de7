//! Error types shared by the feed library and the terminal client.
//!
//! The `WatchlistError` enum covers the few fallible surfaces of the workspace:
//! configuration loading, symbol and command parsing, tick generation, and the
//! dispatcher worker lifecycle. Membership operations on the registry and the
//! dispatcher are total and never produce one of these.
use std::io;

use thiserror::Error;

/// Unified error type shared by every crate in the workspace.
#[derive(Error, Debug)]
pub enum WatchlistError {
    /// I/O error from reading files or spawning threads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Raw input could not be turned into a `Symbol`.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// A line typed by the user did not start with a known command word.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A command that takes symbols was given none.
    #[error("{0} needs at least one symbol")]
    MissingSymbols(String),

    /// Configuration values are out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The tick generator refused to produce a tick for `symbol`.
    #[error("Tick generation failed for {symbol}: {reason}")]
    Generator {
        /// Symbol whose slot in the cycle failed.
        symbol: String,
        /// Human-readable cause.
        reason: String,
    },

    /// The tick generator panicked while producing a tick for the symbol.
    #[error("Tick generator panicked for {0}")]
    GeneratorPanicked(String),

    /// `start` was called on a dispatcher whose worker is already running.
    #[error("Dispatcher is already running")]
    AlreadyRunning,
}

impl WatchlistError {
    /// Shorthand for a generator failure on `symbol`.
    pub fn generator(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        WatchlistError::Generator {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}
