//! Tick payload pushed by the dispatcher to its observer.
//!
//! A `Tick` carries the symbol, the observed price, a volume and a millisecond
//! UTC timestamp. Price and volume are opaque to the feed; only the
//! presentation layer gives them meaning.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;

/// A single (price, volume) observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Symbol the observation belongs to.
    pub symbol: Symbol,
    /// Observed price.
    pub price: f64,
    /// Volume associated with this tick.
    pub volume: u32,
    /// UTC timestamp in milliseconds since Unix epoch.
    pub timestamp: u64,
}

impl Tick {
    /// Build a tick stamped with the current time.
    pub fn new(symbol: Symbol, price: f64, volume: u32) -> Self {
        Tick {
            symbol,
            price,
            volume,
            timestamp: Utc::now().timestamp_millis().max(0) as u64,
        }
    }
}
