//! Replay driver: pushes a time-ordered event stream through an [`OrderBook`]
//! and collects the fills it produces.
//!
//! ## Input format
//! One JSON [`TimedEvent`] per line. Blank lines and lines starting with `#`
//! are skipped. Timestamps must be non-decreasing unless
//! [`ReplayConfig::allow_unordered`] is set.
//!
//! ## Output
//! A [`ReplaySummary`] holding every fill tagged with the timestamp of the event
//! that produced it, plus per-kind event counts.

use serde::Serialize;
use std::io::BufRead;
use tracing::{debug, info};

use crate::{
    config::ReplayConfig,
    errors::{ReplayError, ReplayResult},
    event::{EventKind, TimedEvent},
    fill::Fill,
    orderbook::OrderBook,
    price::PriceScaler,
};

/// A [`Fill`] stamped with the timestamp of the event that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedFill {
    pub ts: u64,
    #[serde(flatten)]
    pub fill: Fill,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub quotes: usize,
    pub trades: usize,
    pub order_events: usize,
    pub fills: Vec<TimedFill>,
    /// Sum of filled quantity, in integer book units.
    pub filled_qty: i64,
    /// Orders still resting when the stream ended.
    pub resting: usize,
}

impl ReplaySummary {
    fn step(&mut self, book: &mut OrderBook, ev: &TimedEvent, scaler: &PriceScaler) {
        ev.event.apply(book, scaler);
        debug_assert!(book.is_consistent(), "book inconsistent after {:?}", ev);

        self.events += 1;
        match ev.event.kind() {
            EventKind::Quote => self.quotes += 1,
            EventKind::Trade => self.trades += 1,
            EventKind::Order => self.order_events += 1,
        }
        for fill in book.drain() {
            debug!(ts = ev.ts, ?fill, "fill");
            self.filled_qty += fill.quantity;
            self.fills.push(TimedFill { ts: ev.ts, fill });
        }
    }

    fn finish(&mut self, book: &OrderBook) {
        self.resting = book.len();
        info!(
            events = self.events,
            fills = self.fills.len(),
            filled_qty = self.filled_qty,
            resting = self.resting,
            "replay finished"
        );
    }
}

/// Replays already-parsed events in the order given. No timestamp check is made.
pub fn replay_events<'a, I>(events: I, book: &mut OrderBook, scaler: &PriceScaler) -> ReplaySummary
where
    I: IntoIterator<Item = &'a TimedEvent>,
{
    let mut summary = ReplaySummary::default();
    for ev in events {
        summary.step(book, ev, scaler);
    }
    summary.finish(book);
    summary
}

/// Reads JSON-lines events from `reader` and replays them through `book`.
///
/// # Errors
/// - [`ReplayError::Io`] if the reader fails.
/// - [`ReplayError::Parse`] on the first line that is not a valid event.
/// - [`ReplayError::OutOfOrder`] when a timestamp goes backwards and
///   `cfg.allow_unordered` is off.
///
/// Events before the failing line have already been applied to `book`.
pub fn replay<R: BufRead>(
    reader: R,
    book: &mut OrderBook,
    cfg: &ReplayConfig,
) -> ReplayResult<ReplaySummary> {
    let scaler = cfg.scaler();
    let mut summary = ReplaySummary::default();
    let mut last_ts: Option<u64> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let ev: TimedEvent = serde_json::from_str(text).map_err(|source| ReplayError::Parse {
            line: line_no,
            source,
        })?;

        if let Some(prev) = last_ts {
            if ev.ts < prev && !cfg.allow_unordered {
                return Err(ReplayError::OutOfOrder {
                    line: line_no,
                    prev,
                    ts: ev.ts,
                });
            }
        }
        last_ts = Some(last_ts.map_or(ev.ts, |prev| prev.max(ev.ts)));

        summary.step(book, &ev, &scaler);
    }

    summary.finish(book);
    Ok(summary)
}
