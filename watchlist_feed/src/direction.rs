//! Price movement direction derived from the previous and current price.

use serde::Serialize;
use std::cmp::Ordering;
use strum_macros::{Display, EnumString};

/// Which way the last update moved the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PriceDirection {
    /// No history yet, or the price did not change.
    Neutral,
    /// Price went up.
    Increase,
    /// Price went down.
    Decrease,
}

impl PriceDirection {
    /// Compare `price` against `previous`. An unset previous price, an equal
    /// price, or an incomparable pair (NaN) is neutral.
    pub fn between(previous: Option<f64>, price: f64) -> Self {
        match previous.and_then(|prev| price.partial_cmp(&prev)) {
            Some(Ordering::Greater) => PriceDirection::Increase,
            Some(Ordering::Less) => PriceDirection::Decrease,
            Some(Ordering::Equal) | None => PriceDirection::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_table() {
        assert_eq!(PriceDirection::between(Some(100.0), 100.0), PriceDirection::Neutral);
        assert_eq!(PriceDirection::between(Some(100.0), 150.0), PriceDirection::Increase);
        assert_eq!(PriceDirection::between(Some(150.0), 100.0), PriceDirection::Decrease);
        assert_eq!(PriceDirection::between(None, 42.0), PriceDirection::Neutral);
        assert_eq!(PriceDirection::between(None, 0.0), PriceDirection::Neutral);
    }

    #[test]
    fn nan_is_neutral() {
        assert_eq!(PriceDirection::between(Some(f64::NAN), 1.0), PriceDirection::Neutral);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(PriceDirection::Increase.to_string(), "increase");
        assert_eq!("decrease".parse::<PriceDirection>().unwrap(), PriceDirection::Decrease);
    }
}
