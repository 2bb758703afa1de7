//!
//! Common types and utilities shared by the watchlist feed and its client.
//!
//! This crate aggregates:
//! - `error` — unified error type `WatchlistError` used across the workspace.
//! - `result` — handy `Result<T, WatchlistError>` alias.
//! - `symbol` — symbol keys and parsing helpers for user input.
//! - `tick` — the price/volume observation pushed by the dispatcher.
//! - `config` — feed configuration, defaults and validation.
#![warn(missing_docs)]
pub mod config;
pub mod error;
pub mod result;
pub mod symbol;
pub mod tick;

pub use config::{FeedConfig, GeneratorKind};
pub use error::WatchlistError;
pub use result::Result;
pub use symbol::{Symbol, SymbolParser};
pub use tick::Tick;
