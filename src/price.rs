use serde::{Deserialize, Serialize};

/// Default fixed-point resolution: 1e-8 of a price or size unit.
pub const DEFAULT_SCALE: i64 = 100_000_000;

/// Converts decimal feed values into the integer units the book works in.
///
/// Rounds to the nearest unit, so `0.1 + 0.2` and `0.3` land on the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceScaler {
    scale: i64,
}

impl PriceScaler {
    /// `scale` must be positive; anything else falls back to 1 (no scaling).
    pub fn new(scale: i64) -> Self {
        Self {
            scale: scale.max(1),
        }
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    pub fn to_int(&self, value: f64) -> i64 {
        (value * self.scale as f64).round() as i64
    }

    pub fn to_float(&self, value: i64) -> f64 {
        value as f64 / self.scale as f64
    }
}

impl Default for PriceScaler {
    fn default() -> Self {
        PriceScaler::new(DEFAULT_SCALE)
    }
}
