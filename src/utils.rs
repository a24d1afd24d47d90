//! Miscellaneous helper utilities.

use crate::models::TopOfBook;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Spawns a background reader that logs the published top of book every
/// `interval_secs`. It never touches the book itself, only the latest
/// whole-batch view on the `watch` channel. Ends when the writer is gone.
pub fn spawn_top_of_book_reporter(
    mut rx: watch::Receiver<TopOfBook>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            if rx.has_changed().is_err() {
                break;
            }
            let top = rx.borrow_and_update().clone();
            match (&top.best_bid, &top.best_ask) {
                (Some(bid), Some(ask)) => tracing::info!(
                    bid = %bid.price,
                    bid_size = %bid.size,
                    ask = %ask.price,
                    ask_size = %ask.size,
                    spread = ?top.spread().map(|s| s.to_string()),
                    bid_depth = top.bid_depth,
                    ask_depth = top.ask_depth,
                    batches = top.batches,
                    "[HEARTBEAT] top of book"
                ),
                _ => tracing::info!(
                    bid_depth = top.bid_depth,
                    ask_depth = top.ask_depth,
                    batches = top.batches,
                    "[HEARTBEAT] waiting for both sides of the book"
                ),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reporter_stops_when_writer_is_dropped() {
        let (tx, rx) = watch::channel(TopOfBook::default());
        let handle = spawn_top_of_book_reporter(rx, 1);
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        drop(tx);
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("reporter should exit")
            .expect("reporter task");
    }
}
