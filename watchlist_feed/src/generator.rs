//! Pluggable tick generation.
//!
//! The dispatcher only knows the [`TickGenerator`] trait. Two synthetic
//! generators ship with the crate:
//!
//! - [`UniformTickGenerator`] — independent uniform price draws with a constant volume.
//! - [`RandomWalkTickGenerator`] — a small random walk around each symbol's last price.
//!
//! Any `FnMut(&Symbol) -> Result<Tick> + Send` closure is a generator too, which is
//! how tests inject deterministic or failing ticks.

use rand::Rng;
use std::collections::HashMap;
use watchlist_common::{FeedConfig, GeneratorKind, Result, Symbol, Tick, WatchlistError};

/// Starting price of a symbol the random walk has not seen yet.
const INITIAL_PRICE: f64 = 100.0;
/// Floor that keeps random-walk prices positive.
const MIN_PRICE: f64 = 0.01;
/// Maximum relative move per random-walk tick (1%).
const MAX_CHANGE: f64 = 0.01;

/// Produces one tick for a symbol on demand.
pub trait TickGenerator: Send {
    /// Generate the next observation for `symbol`.
    ///
    /// An error only affects this symbol's slot in the current cycle.
    fn generate(&mut self, symbol: &Symbol) -> Result<Tick>;
}

impl<F> TickGenerator for F
where
    F: FnMut(&Symbol) -> Result<Tick> + Send,
{
    fn generate(&mut self, symbol: &Symbol) -> Result<Tick> {
        self(symbol)
    }
}

/// Build the generator selected by `config`.
pub fn from_config(config: &FeedConfig) -> Box<dyn TickGenerator> {
    match config.generator {
        GeneratorKind::Uniform => {
            Box::new(UniformTickGenerator::new(config.price_range, config.volume))
        }
        GeneratorKind::RandomWalk => Box::new(RandomWalkTickGenerator::new()),
    }
}

/// Draws every price uniformly from `[0, price_range)`, rounded to cents.
#[derive(Debug, Clone)]
pub struct UniformTickGenerator {
    price_range: f64,
    volume: u32,
}

impl UniformTickGenerator {
    /// Create a generator with the given price range and constant volume.
    pub fn new(price_range: f64, volume: u32) -> Self {
        Self {
            price_range,
            volume,
        }
    }
}

impl Default for UniformTickGenerator {
    fn default() -> Self {
        let config = FeedConfig::default();
        Self::new(config.price_range, config.volume)
    }
}

impl TickGenerator for UniformTickGenerator {
    fn generate(&mut self, symbol: &Symbol) -> Result<Tick> {
        if !self.price_range.is_finite() || self.price_range <= 0.0 {
            return Err(WatchlistError::generator(
                symbol.as_str(),
                format!("invalid price range {}", self.price_range),
            ));
        }
        let raw: f64 = rand::rng().random_range(0.0..self.price_range);
        let price = (raw * 100.0).round() / 100.0;
        Ok(Tick::new(symbol.clone(), price, self.volume))
    }
}

/// Random walk around the last generated price of each symbol.
#[derive(Debug, Clone, Default)]
pub struct RandomWalkTickGenerator {
    last_prices: HashMap<Symbol, f64>,
}

impl RandomWalkTickGenerator {
    /// Create a generator with no price history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculate the next synthetic price using a small random walk around `current_price`.
    ///
    /// The change is sampled uniformly from `[-1%, +1%]` and the result is
    /// clamped to a minimum positive value.
    pub fn next_price(current_price: f64) -> f64 {
        let change: f64 = rand::rng().random_range(-MAX_CHANGE..MAX_CHANGE);
        (current_price * (1.0 + change)).max(MIN_PRICE)
    }

    /// Synthetic volume: liquid names get a higher baseline.
    fn next_volume(symbol: &Symbol) -> u32 {
        let mut rng = rand::rng();
        match symbol.as_str() {
            "AAPL" | "MSFT" | "TSLA" => 1000 + rng.random_range(0..5000),
            _ => 100 + rng.random_range(0..1000),
        }
    }
}

impl TickGenerator for RandomWalkTickGenerator {
    fn generate(&mut self, symbol: &Symbol) -> Result<Tick> {
        let current = self
            .last_prices
            .get(symbol.as_str())
            .copied()
            .unwrap_or(INITIAL_PRICE);
        let price = Self::next_price(current);
        self.last_prices.insert(symbol.clone(), price);
        Ok(Tick::new(symbol.clone(), price, Self::next_volume(symbol)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_stays_in_range_with_constant_volume() {
        let mut generator = UniformTickGenerator::new(50.0, 550);
        let symbol = Symbol::new("BTC");
        for _ in 0..500 {
            let tick = generator.generate(&symbol).unwrap();
            assert!((0.0..=50.0).contains(&tick.price));
            assert_eq!(tick.volume, 550);
            assert_eq!(tick.symbol, symbol);
            assert_eq!((tick.price * 100.0).round() / 100.0, tick.price);
        }
    }

    #[test]
    fn uniform_rejects_bad_range() {
        let mut generator = UniformTickGenerator::new(0.0, 1);
        let err = generator.generate(&Symbol::new("X")).unwrap_err();
        assert!(matches!(err, WatchlistError::Generator { ref symbol, .. } if symbol == "X"));
    }

    #[test]
    fn random_walk_moves_at_most_one_percent() {
        let mut generator = RandomWalkTickGenerator::new();
        let symbol = Symbol::new("AAPL");
        let mut last = INITIAL_PRICE;
        for _ in 0..200 {
            let tick = generator.generate(&symbol).unwrap();
            assert!(tick.price >= MIN_PRICE);
            assert!((tick.price - last).abs() <= last * MAX_CHANGE + 1e-9);
            assert!((1000..6000).contains(&tick.volume));
            last = tick.price;
        }
    }

    #[test]
    fn random_walk_tracks_symbols_independently() {
        let mut generator = RandomWalkTickGenerator::new();
        generator.generate(&Symbol::new("A")).unwrap();
        let b = generator.generate(&Symbol::new("B")).unwrap();
        assert!((b.price - INITIAL_PRICE).abs() <= INITIAL_PRICE * MAX_CHANGE);
        assert!((100..1100).contains(&b.volume));
    }

    #[test]
    fn closures_are_generators() {
        let mut calls = 0;
        let mut generator = |symbol: &Symbol| -> Result<Tick> {
            calls += 1;
            Ok(Tick::new(symbol.clone(), 1.5, 2))
        };
        let tick = TickGenerator::generate(&mut generator, &Symbol::new("Z")).unwrap();
        assert_eq!(tick.price, 1.5);
        assert_eq!(calls, 1);
    }

    #[test]
    fn from_config_respects_kind() {
        let config = FeedConfig {
            price_range: 1.0,
            volume: 3,
            ..FeedConfig::default()
        };
        let tick = from_config(&config).generate(&Symbol::new("Q")).unwrap();
        assert_eq!(tick.volume, 3);
        assert!(tick.price <= 1.0);
    }
}
