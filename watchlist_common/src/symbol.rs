//! Symbol keys and helpers shared between the feed and the client.
//!
//! The feed treats a `Symbol` as an opaque unique key. Case folding and trimming
//! belong to whoever reads user input, via [`Symbol::normalize`] or
//! [`SymbolParser::parse_from_reader`].

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::error::WatchlistError;

/// Unique identifier of a tracked instrument, e.g. `AAPL` or `BTC`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Wraps `raw` as-is. No trimming or case folding happens here.
    pub fn new(raw: impl Into<String>) -> Self {
        Symbol(raw.into())
    }

    /// Canonical form of user input: surrounding whitespace trimmed and ASCII
    /// letters uppercased.
    ///
    /// Fails on empty input and on input with inner whitespace, since that is
    /// two symbols, not one.
    pub fn normalize(raw: &str) -> Result<Self, WatchlistError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(WatchlistError::InvalidSymbol(raw.to_string()));
        }
        Ok(Symbol(trimmed.to_ascii_uppercase()))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(raw: &str) -> Self {
        Symbol::new(raw)
    }
}

impl From<String> for Symbol {
    fn from(raw: String) -> Self {
        Symbol(raw)
    }
}

impl FromStr for Symbol {
    type Err = WatchlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Symbol::normalize(s)
    }
}

/// Trait providing bulk parsing of symbol lists.
pub trait SymbolParser {
    /// Parses symbols from a buffered reader.
    ///
    /// Symbols may be separated by commas, spaces or new lines; blank tokens are
    /// skipped. Order of first appearance is kept and duplicates are left in,
    /// subscribing twice is a no-op downstream anyway.
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Symbol>, WatchlistError>;
}

impl SymbolParser for Symbol {
    fn parse_from_reader<R: BufRead>(reader: R) -> Result<Vec<Self>, WatchlistError> {
        let mut symbols = Vec::new();

        for line_result in reader.lines() {
            let line = line_result?;
            for token in line.split(|c: char| c == ',' || c.is_whitespace()) {
                if token.is_empty() {
                    continue;
                }
                symbols.push(Symbol::normalize(token)?);
            }
        }
        Ok(symbols)
    }
}
