use serde::{Deserialize, Serialize};

/// Which side of the book a resting order sits on.
///
/// # Intuition
/// - `Buy` (Bid): resting bids are visited from **highest to lowest price**, the
///   highest bid is the first one a seller reaches.
/// - `Sell` (Ask): resting asks are visited from **lowest to highest price**, the
///   lowest ask is the first one a buyer reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,  // Bid
    Sell, // Ask
}

impl Side {
    pub fn from_is_buy(is_buy: bool) -> Self {
        if is_buy { Side::Buy } else { Side::Sell }
    }

    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// `true` when a level at `level` is strictly more aggressive than `reference`
    /// for a resting order on this side.
    pub fn is_better(self, level: i64, reference: i64) -> bool {
        match self {
            Side::Buy => level > reference,
            Side::Sell => level < reference,
        }
    }
}

/// A resting passive order owned by the strategy.
///
/// - `price` and `quantity` are integer book units (see [`crate::price::PriceScaler`]).
/// - `rank` is the volume that still has to trade at `price` before this order is
///   reached. `None` means the queue position is unknown: the order is treated as
///   if an unlimited queue sits ahead of it until a quote reports real size at
///   its exact price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: u64,
    pub side: Side,
    pub price: i64,
    pub quantity: i64,
    pub rank: Option<i64>,
}
