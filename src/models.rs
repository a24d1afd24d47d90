//! Shared data structures used throughout the application.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Exact decimal price. Never a binary float, so equal prices are equal keys.
pub type Price = BigDecimal;
/// Exact decimal resting size.
pub type Size = BigDecimal;

/// Side of the book a level rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("buy") {
            Ok(Side::Buy)
        } else if s.eq_ignore_ascii_case("sell") {
            Ok(Side::Sell)
        } else {
            Err(format!("unknown side {s:?}"))
        }
    }
}

/// Aggregated size resting at one price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    pub price: Price,
    pub size: Size,
}

impl PriceLevel {
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// One absolute set-or-remove correction from an incremental update.
/// `size == 0` removes the level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChange {
    pub side: Side,
    pub price: Price,
    pub size: Size,
}

impl DiffChange {
    pub fn new(side: Side, price: Price, size: Size) -> Self {
        Self { side, price, size }
    }
}

/// Full-depth baseline delivered once at subscription time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

/// One ordered batch of diffs plus the feed's own time text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub changes: Vec<DiffChange>,
    pub timestamp: String,
}

/// Batch time attached to a cross. `Unknown` when the feed time did not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    At(DateTime<Utc>),
    Unknown,
}

impl EventTime {
    /// Parse an RFC 3339 instant such as `2019-08-14T20:42:27.265Z`.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn is_known(&self) -> bool {
        matches!(self, EventTime::At(_))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::At(t) => write!(f, "{}", t.to_rfc3339()),
            EventTime::Unknown => f.write_str("unknown"),
        }
    }
}

/// Emitted once per batch that leaves best bid >= best ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossEvent {
    pub timestamp: EventTime,
    pub best_bid: Price,
    pub best_ask: Price,
}

impl fmt::Display for CrossEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cross {} {} {}", self.timestamp, self.best_bid, self.best_ask)
    }
}

/// Immutable best-price view published to readers after each whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopOfBook {
    pub best_bid: Option<PriceLevel>,
    pub best_ask: Option<PriceLevel>,
    pub bid_depth: usize,
    pub ask_depth: usize,
    /// Snapshots and update batches applied so far.
    pub batches: u64,
}

impl TopOfBook {
    pub fn is_crossed(&self) -> bool {
        match (&self.best_bid, &self.best_ask) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }

    /// Best ask minus best bid; negative or zero when crossed.
    pub fn spread(&self) -> Option<Price> {
        match (&self.best_bid, &self.best_ask) {
            (Some(bid), Some(ask)) => Some(&ask.price - &bid.price),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        s.parse().expect("decimal literal")
    }

    #[test]
    fn side_parses_feed_spelling() {
        assert_eq!("buy".parse::<Side>(), Ok(Side::Buy));
        assert_eq!("SELL".parse::<Side>(), Ok(Side::Sell));
        assert!("bid".parse::<Side>().is_err());
    }

    #[test]
    fn event_time_parses_rfc3339_and_rejects_garbage() {
        let t = EventTime::parse("2019-08-14T20:42:27.265Z").expect("valid time");
        assert_eq!(t.timestamp_millis(), 1_565_815_347_265);
        assert!(EventTime::parse("yesterday").is_none());
        assert!(EventTime::parse("").is_none());
    }

    #[test]
    fn cross_event_display_marks_unknown_time() {
        let ev = CrossEvent {
            timestamp: EventTime::Unknown,
            best_bid: dec("101.5"),
            best_ask: dec("101.0"),
        };
        assert_eq!(ev.to_string(), "cross unknown 101.5 101.0");
    }

    #[test]
    fn top_of_book_requires_both_sides_to_cross() {
        let mut top = TopOfBook {
            best_bid: Some(PriceLevel::new(dec("100"), dec("1"))),
            ..Default::default()
        };
        assert!(!top.is_crossed());
        assert_eq!(top.spread(), None);

        top.best_ask = Some(PriceLevel::new(dec("100.00"), dec("2")));
        assert!(top.is_crossed());
        assert_eq!(top.spread(), Some(dec("0")));
    }
}
