//! Synthetic market tape for exercising the fill simulator without historical data.
//!
//! ## What gets generated
//! - A mid price that random-walks with Gaussian drift `N(0, noise_sigma)` ticks per step.
//! - Best bid / best ask snapped to the tick grid, one tick apart.
//! - Each step is either a quote update on one side, or (with probability
//!   `trade_prob`) a trade print at the touch hitting a random side.
//! - Sizes are `Exp1 * mean_qty`; inter-arrival gaps are exponential with a
//!   mean of one millisecond.
//! - A toy strategy rests one bid and one ask at the touch at the start and
//!   re-quotes (cancel + add) every `requote_every` steps.
//!
//! The tape only depends on `SimConfig`, so a given seed always yields the same events.

use anyhow::ensure;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Exp, Exp1, Normal};

use crate::{
    config::SimConfig,
    event::{BookEvent, TimedEvent},
    orders::Side,
};

/// Mean gap between generated events, in nanoseconds.
const MEAN_GAP_NS: f64 = 1_000_000.0;

pub fn generate(cfg: &SimConfig) -> anyhow::Result<Vec<TimedEvent>> {
    ensure!(cfg.tick > 0.0, "tick must be > 0");
    ensure!(
        (0.0..=1.0).contains(&cfg.trade_prob),
        "trade_prob must be within [0, 1]"
    );
    ensure!(cfg.mean_qty > 0.0, "mean_qty must be > 0");

    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let gap_dist = Exp::new(1.0 / MEAN_GAP_NS)?;
    let drift = Normal::new(0.0, cfg.noise_sigma)?;

    let snap = |px: f64| (px / cfg.tick).floor() * cfg.tick;
    let mut events = Vec::with_capacity(cfg.steps + 4 * (cfg.steps / cfg.requote_every.max(1) + 1));
    let mut ts = 0u64;
    let mut mid = cfg.start_price;
    let mut next_id = 1u64;
    let mut live: Vec<u64> = Vec::new();

    for step in 0..cfg.steps {
        ts += gap_dist.sample(&mut rng) as u64 + 1;
        mid += drift.sample(&mut rng) * cfg.tick;
        let bid = snap(mid);
        let ask = bid + cfg.tick;

        if step == 0 || (cfg.requote_every > 0 && step % cfg.requote_every == 0) {
            for id in live.drain(..) {
                events.push(TimedEvent {
                    ts,
                    event: BookEvent::Cancel { id },
                });
            }
            for (side, price) in [(Side::Buy, bid), (Side::Sell, ask)] {
                events.push(TimedEvent {
                    ts,
                    event: BookEvent::Add {
                        id: next_id,
                        side,
                        price,
                        qty: cfg.order_qty,
                        rank: None,
                    },
                });
                live.push(next_id);
                next_id += 1;
            }
        }

        let raw: f64 = <Exp1 as Distribution<f64>>::sample(&Exp1, &mut rng);
        let qty = raw * cfg.mean_qty;
        let event = if rng.random_bool(cfg.trade_prob) {
            let (maker_side, price) = if rng.random_bool(0.5) {
                (Side::Buy, bid)
            } else {
                (Side::Sell, ask)
            };
            BookEvent::Trade {
                maker_side,
                price,
                volume: qty,
            }
        } else {
            let (side, price) = if rng.random_bool(0.5) {
                (Side::Buy, bid)
            } else {
                (Side::Sell, ask)
            };
            BookEvent::Quote { side, price, qty }
        };
        events.push(TimedEvent { ts, event });
    }
    Ok(events)
}
