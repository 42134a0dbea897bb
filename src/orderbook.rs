use crate::{
    fill::Fill,
    orders::{Order, Side},
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque, btree_map};
use tracing::{debug, trace, warn};

/// An [`OrderBook`] holds the strategy's **own** resting orders and simulates
/// when historical market data would have filled them.
///
/// Orders live in a single owning store keyed by id. Each side keeps a
/// [`BTreeMap`] from price to a FIFO queue of ids ([`VecDeque`]) to maintain
/// **price-time** priority:
/// - `bids`: visited **in reverse** so the highest bid comes first.
/// - `asks`: visited **forwards** so the lowest ask comes first.
///
/// Every id in `orders` sits in exactly one level queue of its side and every
/// queue is non-empty. Each mutating method restores this before returning.
///
/// # Silent no-ops
/// Unknown ids on [`cancel`](OrderBook::cancel) / [`reduce`](OrderBook::reduce)
/// and duplicate ids on [`add`](OrderBook::add) are ignored rather than reported
/// as errors. A driver bug that cancels the wrong id will therefore not surface
/// here; check [`has`](OrderBook::has) on the caller side when that matters.
#[derive(Debug, Default)]
pub struct OrderBook {
    orders: HashMap<u64, Order>,
    bids: BTreeMap<i64, VecDeque<u64>>,
    asks: BTreeMap<i64, VecDeque<u64>>,
    fills: Vec<Fill>,
}

/// Aggregated view of one price level, as returned by [`OrderBook::depth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub price: i64,
    pub quantity: i64,
    pub orders: usize,
}

/// Unifies forward (`Iter`) and reverse (`Rev<Iter>`) BTreeMap iteration so
/// both sides can be walked best-first through one type.
enum LevelIter<'a> {
    /// Ascending prices (asks).
    Fwd(btree_map::Iter<'a, i64, VecDeque<u64>>),
    /// Descending prices (bids).
    Rev(std::iter::Rev<btree_map::Iter<'a, i64, VecDeque<u64>>>),
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (&'a i64, &'a VecDeque<u64>);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            LevelIter::Fwd(iter) => iter.next(),
            LevelIter::Rev(iter) => iter.next(),
        }
    }
}

impl OrderBook {
    /// Creates a new, empty [`OrderBook`] with no resting orders and no pending fills.
    pub fn new() -> Self {
        Self::default()
    }

    fn levels(&self, side: Side) -> &BTreeMap<i64, VecDeque<u64>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn levels_mut(&mut self, side: Side) -> &mut BTreeMap<i64, VecDeque<u64>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn iter_levels(&self, side: Side) -> LevelIter<'_> {
        match side {
            Side::Buy => LevelIter::Rev(self.bids.iter().rev()),
            Side::Sell => LevelIter::Fwd(self.asks.iter()),
        }
    }

    fn best_level(&self, side: Side) -> Option<i64> {
        self.iter_levels(side).next().map(|(price, _)| *price)
    }

    /// Adds a resting order at the **back** of its price level.
    ///
    /// `initial_rank = None` leaves the queue position unknown until a quote
    /// reports size at `price` (see [`on_quote`](OrderBook::on_quote)).
    ///
    /// Returns `false` without touching the book when `id` is already live
    /// (first registration wins) or when `quantity` is not positive.
    pub fn add(
        &mut self,
        id: u64,
        side: Side,
        price: i64,
        quantity: i64,
        initial_rank: Option<i64>,
    ) -> bool {
        if self.orders.contains_key(&id) {
            warn!(id, "duplicate order id, ignoring add");
            return false;
        }
        if quantity <= 0 {
            warn!(id, quantity, "non-positive quantity, ignoring add");
            return false;
        }
        let order = Order {
            id,
            side,
            price,
            quantity,
            rank: initial_rank.map(|rank| rank.max(0)),
        };
        trace!(?order, "adding order");
        self.orders.insert(id, order);
        self.levels_mut(side)
            .entry(price)
            .or_default()
            .push_back(id);
        true
    }

    /// Removes an order from the book. Unknown ids are a no-op and return `false`.
    pub fn cancel(&mut self, id: u64) -> bool {
        let Some(order) = self.orders.remove(&id) else {
            return false;
        };
        trace!(id, "cancelling order");
        self.unlink(order.side, order.price, id);
        true
    }

    /// Shrinks an order by `delta`, cancelling it once nothing is left.
    /// Unknown ids are a no-op.
    pub fn reduce(&mut self, id: u64, delta: i64) {
        let Some(order) = self.orders.get_mut(&id) else {
            return;
        };
        order.quantity -= delta;
        trace!(id, delta, remaining = order.quantity, "reducing order");
        if order.quantity <= 0 {
            self.cancel(id);
        }
    }

    /// Removes every resting order without emitting fills. Pending fills are kept.
    ///
    /// Returns how many orders were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.orders.len();
        self.orders.clear();
        self.bids.clear();
        self.asks.clear();
        debug!(dropped, "cancelled all resting orders");
        dropped
    }

    pub fn has(&self, id: u64) -> bool {
        self.orders.contains_key(&id)
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn best_bid(&self) -> Option<i64> {
        self.best_level(Side::Buy)
    }

    pub fn best_ask(&self) -> Option<i64> {
        self.best_level(Side::Sell)
    }

    /// Ids resting at one level, front of the queue first.
    pub fn level_ids(&self, side: Side, price: i64) -> Vec<u64> {
        self.levels(side)
            .get(&price)
            .map(|queue| queue.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Aggregated levels for one side, best price first.
    pub fn depth(&self, side: Side) -> Vec<LevelSummary> {
        self.iter_levels(side)
            .map(|(&price, queue)| LevelSummary {
                price,
                quantity: queue
                    .iter()
                    .filter_map(|id| self.orders.get(id))
                    .map(|o| o.quantity)
                    .sum(),
                orders: queue.len(),
            })
            .collect()
    }

    /// Number of fills emitted but not yet returned by [`drain`](OrderBook::drain).
    pub fn pending_fills(&self) -> usize {
        self.fills.len()
    }

    /// Returns every pending fill in emission order and clears the queue.
    pub fn drain(&mut self) -> Vec<Fill> {
        std::mem::take(&mut self.fills)
    }

    /// Processes a new best quote (`is_buy = true` for a new best bid).
    ///
    /// # Behavior
    /// 1. **Sweep**: a new bid at `price` means every resting ask at or below
    ///    `price` must already have traded. Each such level is filled in full at
    ///    the orders' own price and dropped. Symmetric for a new ask against
    ///    resting bids. Several levels may go in one call.
    /// 2. **Lazy reset**: orders on the quoted side at exactly `price` whose rank
    ///    is still unknown take `market_qty` as their rank. Known ranks are never
    ///    overwritten.
    pub fn on_quote(&mut self, is_buy: bool, price: i64, market_qty: i64) {
        let quoted = Side::from_is_buy(is_buy);
        let resting = quoted.opposite();

        while let Some(level) = self.best_level(resting) {
            let crossed = match resting {
                Side::Sell => level <= price,
                Side::Buy => level >= price,
            };
            if !crossed {
                break;
            }
            debug!(?resting, level, quote = price, "quote crossed resting level");
            self.sweep_level(resting, level);
        }

        let levels = match quoted {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        };
        if let Some(queue) = levels.get(&price) {
            for id in queue {
                if let Some(order) = self.orders.get_mut(id) {
                    if order.rank.is_none() {
                        order.rank = Some(market_qty.max(0));
                        trace!(id, rank = ?order.rank, "initialised queue rank");
                    }
                }
            }
        }
    }

    /// Processes a trade print whose passive side is `maker_is_buy`
    /// (`true` = a resting bid was hit).
    ///
    /// Levels on that side are walked best-first:
    /// - **Sweep**: a level strictly better than `price` is filled in full at its
    ///   own price, then the walk continues.
    /// - **Touch**: the level at `price` has `volume` taken off every order's
    ///   rank. An order whose rank goes negative fills `min(quantity, -rank)` and
    ///   its rank is reset to 0. The walk stops here.
    /// - **No match**: a worse level stops the walk untouched.
    ///
    /// Orders whose rank is still unknown are never reached by a touch.
    pub fn on_trade(&mut self, maker_is_buy: bool, price: i64, volume: i64) {
        let side = Side::from_is_buy(maker_is_buy);

        while let Some(level) = self.best_level(side) {
            if side.is_better(level, price) {
                debug!(?side, level, trade = price, "trade swept resting level");
                self.sweep_level(side, level);
                continue;
            }
            if level == price {
                self.touch_level(side, level, volume);
            }
            break;
        }
    }

    /// Fills every order at one level in full and drops the level.
    fn sweep_level(&mut self, side: Side, price: i64) {
        let Some(queue) = self.levels_mut(side).remove(&price) else {
            return;
        };
        for id in queue {
            if let Some(order) = self.orders.remove(&id) {
                self.fills
                    .push(Fill::maker(order.id, order.price, order.quantity));
            }
        }
    }

    fn touch_level(&mut self, side: Side, price: i64, volume: i64) {
        if volume <= 0 {
            return;
        }
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let Some(queue) = levels.get_mut(&price) else {
            return;
        };
        let orders = &mut self.orders;
        let fills = &mut self.fills;

        queue.retain(|id| {
            let Some(order) = orders.get_mut(id) else {
                return false;
            };
            let Some(rank) = order.rank.as_mut() else {
                return true;
            };
            *rank -= volume;
            if *rank >= 0 {
                return true;
            }
            // negative rank is how much of the print reached this order
            let overflow = -*rank;
            *rank = 0;
            let filled = order.quantity.min(overflow);
            order.quantity -= filled;
            debug!(id = order.id, filled, remaining = order.quantity, "trade touched order");
            fills.push(Fill::maker(order.id, price, filled));
            if order.quantity > 0 {
                return true;
            }
            orders.remove(id);
            false
        });

        if queue.is_empty() {
            levels.remove(&price);
        }
    }

    /// Unlinks `id` from its level queue, keeping sibling order, and prunes the
    /// level if it became empty.
    fn unlink(&mut self, side: Side, price: i64, id: u64) {
        let levels = self.levels_mut(side);
        let Some(queue) = levels.get_mut(&price) else {
            return;
        };
        if let Some(pos) = queue.iter().position(|&o| o == id) {
            queue.remove(pos);
        }
        if queue.is_empty() {
            levels.remove(&price);
        }
    }

    /// Checks that every live id is linked exactly once, in a level of its own
    /// side and price, that no level is empty, and that no resting order has a
    /// non-positive quantity or a negative rank.
    pub fn is_consistent(&self) -> bool {
        let mut linked = HashSet::with_capacity(self.orders.len());
        for side in [Side::Buy, Side::Sell] {
            for (&price, queue) in self.levels(side) {
                if queue.is_empty() {
                    return false;
                }
                for id in queue {
                    let Some(order) = self.orders.get(id) else {
                        return false;
                    };
                    if order.side != side || order.price != price {
                        return false;
                    }
                    if !linked.insert(*id) {
                        return false;
                    }
                }
            }
        }
        linked.len() == self.orders.len()
            && self
                .orders
                .values()
                .all(|o| o.quantity > 0 && o.rank.is_none_or(|r| r >= 0))
    }
}
