//! Plain configuration values for the replay driver and the synthetic tape.
//!
//! Both are filled in from the command line by [`crate::cli`], but can be built
//! directly (or via `Default`) when the crate is used as a library.

use crate::price::{DEFAULT_SCALE, PriceScaler};

#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Fixed-point multiplier applied to every decimal price/size in the input.
    pub scale: i64,
    /// Accept timestamps that go backwards instead of failing the replay.
    pub allow_unordered: bool,
}

impl ReplayConfig {
    pub fn scaler(&self) -> PriceScaler {
        PriceScaler::new(self.scale)
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            allow_unordered: false,
        }
    }
}

/// Parameters of the synthetic market tape.
///
/// - `steps`: number of market events (quotes and trades) to generate.
/// - `seed`: RNG seed; the same seed always yields the same tape.
/// - `start_price`: initial mid price.
/// - `tick`: price increment; the best bid is the mid snapped down to the grid, the ask one tick above.
/// - `noise_sigma`: standard deviation of the Gaussian mid drift, in ticks per step.
/// - `trade_prob`: probability a step is a trade print rather than a quote update.
/// - `mean_qty`: average quoted / traded size (exponentially distributed).
/// - `order_qty`: size of each strategy order.
/// - `requote_every`: the strategy cancels and re-rests its orders every this many steps (0 = only once).
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub steps: usize,
    pub seed: u64,
    pub start_price: f64,
    pub tick: f64,
    pub noise_sigma: f64,
    pub trade_prob: f64,
    pub mean_qty: f64,
    pub order_qty: f64,
    pub requote_every: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            steps: 1_000,
            seed: 7,
            start_price: 100.0,
            tick: 0.5,
            noise_sigma: 0.3,
            trade_prob: 0.4,
            mean_qty: 5.0,
            order_qty: 2.0,
            requote_every: 50,
        }
    }
}
