//! Feed adapters.
//!
//! Responsibilities:
//! • Connect to an exchange public feed and subscribe to one instrument.
//! • Turn wire frames into the two shapes the book consumes.
//!
//! Reconnection and gap recovery are not handled here; a dropped stream ends.

pub mod coinbase;

use crate::models::{Snapshot, Update};

/// Decoded feed message, delivered to the book writer in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMessage {
    Snapshot(Snapshot),
    Update(Update),
}

pub use coinbase::connect_and_stream;
