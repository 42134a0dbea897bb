use serde::{Deserialize, Serialize};

use crate::{orderbook::OrderBook, orders::Side, price::PriceScaler};

/// One input to the fill simulator, in decimal feed units.
///
/// Serialized internally tagged, e.g.
/// `{"type":"trade","maker_side":"buy","price":100.5,"volume":3.0}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookEvent {
    /// New best quote on `side` with `qty` resting at `price`.
    Quote { side: Side, price: f64, qty: f64 },
    /// Trade print; `maker_side` is the passive side that was hit or lifted.
    Trade {
        maker_side: Side,
        price: f64,
        volume: f64,
    },
    /// Strategy places a resting order. A missing `rank` means unknown queue position.
    Add {
        id: u64,
        side: Side,
        price: f64,
        qty: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rank: Option<f64>,
    },
    Cancel { id: u64 },
    Reduce { id: u64, delta: f64 },
    /// Instrument stopped trading (delivery / expiry): every resting order is dropped.
    Delivery,
}

impl BookEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BookEvent::Quote { .. } => EventKind::Quote,
            BookEvent::Trade { .. } => EventKind::Trade,
            BookEvent::Add { .. }
            | BookEvent::Cancel { .. }
            | BookEvent::Reduce { .. }
            | BookEvent::Delivery => EventKind::Order,
        }
    }

    /// Feeds this event into `book`, converting decimal values with `scaler`.
    pub fn apply(&self, book: &mut OrderBook, scaler: &PriceScaler) {
        match *self {
            BookEvent::Quote { side, price, qty } => {
                book.on_quote(side.is_buy(), scaler.to_int(price), scaler.to_int(qty))
            }
            BookEvent::Trade {
                maker_side,
                price,
                volume,
            } => book.on_trade(
                maker_side.is_buy(),
                scaler.to_int(price),
                scaler.to_int(volume),
            ),
            BookEvent::Add {
                id,
                side,
                price,
                qty,
                rank,
            } => {
                book.add(
                    id,
                    side,
                    scaler.to_int(price),
                    scaler.to_int(qty),
                    rank.map(|r| scaler.to_int(r)),
                );
            }
            BookEvent::Cancel { id } => {
                book.cancel(id);
            }
            BookEvent::Reduce { id, delta } => book.reduce(id, scaler.to_int(delta)),
            BookEvent::Delivery => {
                book.cancel_all();
            }
        }
    }
}

/// Coarse event category, used for replay statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Quote,
    Trade,
    Order,
}

/// A [`BookEvent`] stamped with its exchange timestamp (nanoseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub ts: u64,
    #[serde(flatten)]
    pub event: BookEvent,
}
