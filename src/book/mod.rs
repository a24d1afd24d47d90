//! Aggregated price-level book for a single instrument.
//!
//! Loads one snapshot, applies ordered batches of absolute diffs, and checks
//! for a crossed book (best bid >= best ask) once per batch.

mod side;

use crate::errors::BookError;
use crate::models::{CrossEvent, DiffChange, EventTime, Price, PriceLevel, Side, Size, TopOfBook};
use num_traits::{Signed, Zero};
use side::BookSide;

/// Result of one update batch: the cross, if any, plus every skipped entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct UpdateOutcome {
    pub cross: Option<CrossEvent>,
    pub errors: Vec<BookError>,
}

/// Level-2 book. Owned by exactly one writer; readers get [`TopOfBook`] copies.
#[derive(Debug, Clone)]
pub struct Book {
    bids: BookSide,
    asks: BookSide,
    batches: u64,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            batches: 0,
        }
    }

    fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Replace the book with a full-depth baseline.
    ///
    /// Zero sizes are skipped silently; negative sizes are skipped and
    /// reported. No cross check runs here.
    pub fn load_snapshot(&mut self, bids: &[PriceLevel], asks: &[PriceLevel]) -> Vec<BookError> {
        self.bids.clear();
        self.asks.clear();

        let mut errors = Vec::new();
        for (side, levels) in [(Side::Buy, bids), (Side::Sell, asks)] {
            for level in levels {
                if level.size.is_negative() {
                    errors.push(BookError::InvalidLevel {
                        side,
                        price: level.price.clone(),
                        size: level.size.clone(),
                    });
                    continue;
                }
                if level.size.is_zero() {
                    continue;
                }
                self.side_mut(side)
                    .set(level.price.clone(), level.size.clone());
            }
        }
        self.batches += 1;
        errors
    }

    /// Apply one batch of absolute set-or-remove changes in order, then
    /// evaluate the cross predicate once against the resulting book.
    pub fn apply_update(&mut self, changes: &[DiffChange], timestamp: &str) -> UpdateOutcome {
        let mut errors = Vec::new();
        for change in changes {
            if change.size.is_negative() {
                errors.push(BookError::InvalidLevel {
                    side: change.side,
                    price: change.price.clone(),
                    size: change.size.clone(),
                });
                continue;
            }
            let side = self.side_mut(change.side);
            if change.size.is_zero() {
                side.remove(&change.price);
            } else {
                side.set(change.price.clone(), change.size.clone());
            }
        }
        self.batches += 1;

        let cross = self.crossed_prices().map(|(best_bid, best_ask)| {
            let timestamp = match EventTime::parse(timestamp) {
                Some(at) => EventTime::At(at),
                None => {
                    errors.push(BookError::MalformedTimestamp(timestamp.to_string()));
                    EventTime::Unknown
                }
            };
            CrossEvent {
                timestamp,
                best_bid: best_bid.clone(),
                best_ask: best_ask.clone(),
            }
        });

        UpdateOutcome { cross, errors }
    }

    /// Both best prices when both sides are populated and bid >= ask.
    fn crossed_prices(&self) -> Option<(&Price, &Price)> {
        let bid = self.bids.best()?;
        let ask = self.asks.best()?;
        (bid >= ask).then_some((bid, ask))
    }

    pub fn best_bid(&self) -> Option<&Price> {
        self.bids.best()
    }

    pub fn best_ask(&self) -> Option<&Price> {
        self.asks.best()
    }

    pub fn is_crossed(&self) -> bool {
        self.crossed_prices().is_some()
    }

    /// Resting size at `price`, if that level exists.
    pub fn level(&self, side: Side, price: &Price) -> Option<&Size> {
        self.side(side).get(price)
    }

    /// Levels of one side, best first.
    pub fn levels(&self, side: Side) -> impl Iterator<Item = (&Price, &Size)> + '_ {
        self.side(side).iter()
    }

    pub fn depth(&self, side: Side) -> usize {
        self.side(side).len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Snapshots plus update batches applied so far.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn top_of_book(&self) -> TopOfBook {
        let level = |side: &BookSide| {
            side.best_level()
                .map(|(price, size)| PriceLevel::new(price.clone(), size.clone()))
        };
        TopOfBook {
            best_bid: level(&self.bids),
            best_ask: level(&self.asks),
            bid_depth: self.bids.len(),
            ask_depth: self.asks.len(),
            batches: self.batches,
        }
    }
}
