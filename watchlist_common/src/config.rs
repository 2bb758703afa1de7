//! Feed configuration and its defaults.
//!
//! Values can come from a JSON file (every field optional) and are then
//! overridden by command-line flags in the client. `validate` must pass before
//! a dispatcher is built from the config.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;
use strum_macros::{Display, EnumString};

use crate::error::WatchlistError;

/// Default period of the dispatch cycle in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 3000;
/// Upper bound (exclusive) of uniformly drawn prices.
pub const DEFAULT_PRICE_RANGE: f64 = 10_000.0;
/// Constant volume reported by the uniform generator.
pub const DEFAULT_VOLUME: u32 = 550;

/// Which built-in tick generator the feed should use.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum GeneratorKind {
    /// Independent uniform price draws with a constant volume.
    #[default]
    Uniform,
    /// Small random walk around each symbol's last price.
    RandomWalk,
}

/// Runtime configuration of the tick feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Period of the dispatch cycle.
    pub interval_ms: u64,
    /// Built-in generator used when none is injected.
    pub generator: GeneratorKind,
    /// Price range for the uniform generator.
    pub price_range: f64,
    /// Volume reported by the uniform generator.
    pub volume: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            interval_ms: DEFAULT_INTERVAL_MS,
            generator: GeneratorKind::default(),
            price_range: DEFAULT_PRICE_RANGE,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl FeedConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, WatchlistError> {
        let reader = BufReader::new(File::open(path)?);
        let config: FeedConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values can drive a dispatcher.
    pub fn validate(&self) -> Result<(), WatchlistError> {
        if self.interval_ms == 0 {
            return Err(WatchlistError::InvalidConfig(
                "interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.price_range.is_finite() || self.price_range <= 0.0 {
            return Err(WatchlistError::InvalidConfig(format!(
                "price_range must be a positive number, got {}",
                self.price_range
            )));
        }
        Ok(())
    }

    /// Cycle period as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: FeedConfig = serde_json::from_str(r#"{ "interval_ms": 250 }"#).unwrap();
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.generator, GeneratorKind::Uniform);
        assert_eq!(config.volume, DEFAULT_VOLUME);
        assert_eq!(config.interval(), Duration::from_millis(250));
    }

    #[test]
    fn generator_kind_is_kebab_case() {
        let config: FeedConfig =
            serde_json::from_str(r#"{ "generator": "random-walk" }"#).unwrap();
        assert_eq!(config.generator, GeneratorKind::RandomWalk);
        assert_eq!(GeneratorKind::RandomWalk.to_string(), "random-walk");
        assert_eq!("UNIFORM".parse::<GeneratorKind>().unwrap(), GeneratorKind::Uniform);
    }

    #[test]
    fn validate_rejects_zero_interval_and_bad_range() {
        let zero = FeedConfig {
            interval_ms: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(zero.validate(), Err(WatchlistError::InvalidConfig(_))));

        let negative = FeedConfig {
            price_range: -1.0,
            ..FeedConfig::default()
        };
        assert!(negative.validate().is_err());
        assert!(FeedConfig::default().validate().is_ok());
    }

    #[test]
    fn from_file_reports_missing_file() {
        let result = FeedConfig::from_file(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(WatchlistError::Io(_))));
    }
}
