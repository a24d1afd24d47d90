//! Cross-event sink: logs every detected cross.

use crate::models::CrossEvent;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Drain `rx` until every sender is dropped; returns the number of crosses seen.
pub async fn run_cross_logger(mut rx: mpsc::Receiver<CrossEvent>) -> u64 {
    let mut seen: u64 = 0;
    while let Some(cross) = rx.recv().await {
        seen += 1;
        warn!(
            timestamp = %cross.timestamp,
            bid = %cross.best_bid,
            ask = %cross.best_ask,
            seen,
            "[CROSS] {cross}"
        );
    }
    info!(seen, "[CROSS] sink closed");
    seen
}

pub fn spawn_cross_logger(rx: mpsc::Receiver<CrossEvent>) -> tokio::task::JoinHandle<u64> {
    tokio::spawn(run_cross_logger(rx))
}
