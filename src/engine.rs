//! Single-writer loop that owns the book.
//!
//! Feed messages are applied strictly in arrival order. After each message the
//! writer publishes a fresh [`TopOfBook`] on a `watch` channel, so readers only
//! ever observe whole batches, and forwards any cross to the sink channel.

use crate::book::Book;
use crate::errors::BookError;
use crate::feed::FeedMessage;
use crate::models::{CrossEvent, Side, TopOfBook};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Counters returned when the feed ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub snapshots: u64,
    pub updates: u64,
    pub crosses: u64,
    pub rejected_levels: u64,
    pub malformed_timestamps: u64,
    /// Updates applied before any snapshot arrived.
    pub updates_before_snapshot: u64,
}

impl WriterStats {
    fn record_errors(&mut self, errors: &[BookError]) {
        for err in errors {
            match err {
                BookError::InvalidLevel { .. } => self.rejected_levels += 1,
                BookError::MalformedTimestamp(_) => self.malformed_timestamps += 1,
            }
            warn!(error = %err, "[BOOK] entry rejected");
        }
    }
}

/// Drive `book` from `feed` until the feed ends.
pub async fn run_book_writer<S>(
    feed: S,
    top_tx: watch::Sender<TopOfBook>,
    cross_tx: mpsc::Sender<CrossEvent>,
) -> WriterStats
where
    S: Stream<Item = FeedMessage>,
{
    let mut book = Book::new();
    let mut stats = WriterStats::default();
    let mut sink_open = true;

    futures::pin_mut!(feed);
    while let Some(msg) = feed.next().await {
        match msg {
            FeedMessage::Snapshot(snapshot) => {
                let errors = book.load_snapshot(&snapshot.bids, &snapshot.asks);
                stats.snapshots += 1;
                stats.record_errors(&errors);
                info!(
                    bids = book.depth(Side::Buy),
                    asks = book.depth(Side::Sell),
                    rejected = errors.len(),
                    "[BOOK] snapshot loaded"
                );
            }
            FeedMessage::Update(update) => {
                if stats.snapshots == 0 {
                    if stats.updates_before_snapshot == 0 {
                        warn!("[BOOK] update received before snapshot; applying anyway");
                    }
                    stats.updates_before_snapshot += 1;
                }
                let outcome = book.apply_update(&update.changes, &update.timestamp);
                stats.updates += 1;
                stats.record_errors(&outcome.errors);

                if let Some(cross) = outcome.cross {
                    stats.crosses += 1;
                    if sink_open && cross_tx.send(cross).await.is_err() {
                        warn!("[BOOK] cross sink closed; further crosses are only counted");
                        sink_open = false;
                    }
                }
            }
        }
        top_tx.send_replace(book.top_of_book());
    }

    debug!(?stats, "[BOOK] feed ended");
    stats
}

/// Spawn [`run_book_writer`] on the runtime.
pub fn spawn_book_writer<S>(
    feed: S,
    top_tx: watch::Sender<TopOfBook>,
    cross_tx: mpsc::Sender<CrossEvent>,
) -> tokio::task::JoinHandle<WriterStats>
where
    S: Stream<Item = FeedMessage> + Send + 'static,
{
    tokio::spawn(run_book_writer(feed, top_tx, cross_tx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiffChange, EventTime, Price, PriceLevel, Snapshot, Update};

    fn dec(s: &str) -> Price {
        s.parse().expect("decimal literal")
    }

    fn snapshot(bid: (&str, &str), ask: (&str, &str)) -> FeedMessage {
        FeedMessage::Snapshot(Snapshot {
            bids: vec![PriceLevel::new(dec(bid.0), dec(bid.1))],
            asks: vec![PriceLevel::new(dec(ask.0), dec(ask.1))],
        })
    }

    fn update(changes: Vec<DiffChange>, ts: &str) -> FeedMessage {
        FeedMessage::Update(Update {
            changes,
            timestamp: ts.to_string(),
        })
    }

    #[tokio::test]
    async fn crosses_are_forwarded_in_batch_order() {
        let feed = futures::stream::iter(vec![
            snapshot(("100.0", "2.0"), ("101.0", "1.5")),
            update(
                vec![DiffChange::new(Side::Buy, dec("101.5"), dec("3.0"))],
                "2024-01-01T00:00:00Z",
            ),
            update(
                vec![DiffChange::new(Side::Buy, dec("101.5"), dec("0"))],
                "2024-01-01T00:00:01Z",
            ),
            update(
                vec![DiffChange::new(Side::Sell, dec("99"), dec("1"))],
                "garbled",
            ),
        ]);
        let (top_tx, top_rx) = watch::channel(TopOfBook::default());
        let (cross_tx, mut cross_rx) = mpsc::channel(8);

        let stats = run_book_writer(feed, top_tx, cross_tx).await;
        assert_eq!(stats.snapshots, 1);
        assert_eq!(stats.updates, 3);
        assert_eq!(stats.crosses, 2);
        assert_eq!(stats.malformed_timestamps, 1);

        let first = cross_rx.recv().await.expect("first cross");
        assert_eq!(first.best_bid, dec("101.5"));
        assert_eq!(first.best_ask, dec("101.0"));
        assert!(first.timestamp.is_known());

        let second = cross_rx.recv().await.expect("second cross");
        assert_eq!(second.best_bid, dec("100.0"));
        assert_eq!(second.best_ask, dec("99"));
        assert_eq!(second.timestamp, EventTime::Unknown);
        assert!(cross_rx.recv().await.is_none());

        let top = top_rx.borrow().clone();
        assert_eq!(top.batches, 4);
        assert!(top.is_crossed());
    }

    #[tokio::test]
    async fn rejected_levels_are_counted_and_book_keeps_going() {
        let feed = futures::stream::iter(vec![
            update(
                vec![
                    DiffChange::new(Side::Buy, dec("99.0"), dec("-1.0")),
                    DiffChange::new(Side::Sell, dec("102.0"), dec("1.0")),
                ],
                "2024-01-01T00:00:00Z",
            ),
            snapshot(("100", "-3"), ("101", "1")),
        ]);
        let (top_tx, top_rx) = watch::channel(TopOfBook::default());
        let (cross_tx, _cross_rx) = mpsc::channel(8);

        let stats = run_book_writer(feed, top_tx, cross_tx).await;
        assert_eq!(stats.rejected_levels, 2);
        assert_eq!(stats.updates_before_snapshot, 1);
        assert_eq!(stats.crosses, 0);

        let top = top_rx.borrow().clone();
        assert_eq!(top.best_bid, None);
        assert_eq!(top.best_ask, Some(PriceLevel::new(dec("101"), dec("1"))));
    }

    #[tokio::test]
    async fn closed_sink_does_not_stop_the_writer() {
        let feed = futures::stream::iter(vec![
            snapshot(("100", "1"), ("101", "1")),
            update(
                vec![DiffChange::new(Side::Sell, dec("100"), dec("1"))],
                "2024-01-01T00:00:00Z",
            ),
            update(
                vec![DiffChange::new(Side::Sell, dec("50"), dec("1"))],
                "2024-01-01T00:00:01Z",
            ),
        ]);
        let (top_tx, top_rx) = watch::channel(TopOfBook::default());
        let (cross_tx, cross_rx) = mpsc::channel(8);
        drop(cross_rx);

        let stats = spawn_book_writer(feed, top_tx, cross_tx)
            .await
            .expect("writer task");
        assert_eq!(stats.crosses, 2);
        assert_eq!(top_rx.borrow().best_ask.as_ref().map(|l| l.price.clone()), Some(dec("50")));
    }
}
