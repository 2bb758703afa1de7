//! Command-line arguments for the watchlist client.
//!
//! This module defines the CLI interface using `clap`. Flags override values read
//! from `--config`, which override the built-in defaults.
use clap::Parser;
use std::path::PathBuf;
use watchlist_common::{FeedConfig, GeneratorKind, Result};

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// JSON file with feed settings (`interval_ms`, `generator`, `price_range`, `volume`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Period between price updates in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Synthetic price generator.
    #[arg(long, value_enum)]
    pub generator: Option<GeneratorKind>,

    /// Path to a text file with symbols to subscribe to at startup.
    /// Symbols may be separated by commas, spaces, or new lines.
    #[arg(long)]
    pub path: Option<String>,

    /// Print the watchlist as JSON lines instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Resolve the effective feed configuration.
    pub fn feed_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.config {
            Some(path) => FeedConfig::from_file(path)?,
            None => FeedConfig::default(),
        };
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(generator) = self.generator {
            config.generator = generator;
        }
        config.validate()?;
        Ok(config)
    }
}
