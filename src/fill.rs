use serde::{Deserialize, Serialize};

/// A simulated execution against one of the strategy's resting orders.
///
/// # Behavior
/// - `price` is always the resting order's own price, never the price of the
///   quote or print that triggered the fill.
/// - Partial fills may occur: one order can produce several fills over its life.
/// - `maker` is always `true`; the engine never originates taking orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: u64,
    pub price: i64,
    pub quantity: i64,
    pub maker: bool,
}

impl Fill {
    pub(crate) fn maker(order_id: u64, price: i64, quantity: i64) -> Self {
        Fill {
            order_id,
            price,
            quantity,
            maker: true,
        }
    }
}
