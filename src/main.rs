use anyhow::Result;
use orderbook_cross_detector::{config::AppConfig, engine, feed, models::TopOfBook, sink, utils};
use tokio::sync::{mpsc, watch};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    utils::init_logging();

    let config = AppConfig::load()?;
    tracing::info!(
        url = %config.feed.ws_url,
        product_id = %config.feed.product_id,
        heartbeat_secs = config.heartbeat_secs,
        "[INIT] orderbook-cross-detector starting"
    );

    // Shared state channels
    let (top_tx, top_rx) = watch::channel(TopOfBook::default());
    let (cross_tx, cross_rx) = mpsc::channel(config.cross_channel_capacity);

    // Feed -> single book writer ------------------------------------------
    let stream = feed::connect_and_stream(config.feed.clone()).await?;
    let writer = engine::spawn_book_writer(stream, top_tx, cross_tx);

    // Sink and readers ----------------------------------------------------
    let sink_task = sink::spawn_cross_logger(cross_rx);
    if config.heartbeat_secs > 0 {
        let _reporter = utils::spawn_top_of_book_reporter(top_rx, config.heartbeat_secs);
    }

    tokio::select! {
        res = writer => {
            let stats = res?;
            tracing::warn!(?stats, "[FEED] stream ended");
        }
        res = tokio::signal::ctrl_c() => {
            res?;
            tracing::info!("[INIT] interrupt received, shutting down");
            return Ok(());
        }
    }

    // Writer is gone, so the sink drains whatever is buffered and stops.
    let crosses = sink_task.await?;
    tracing::info!(crosses, "[INIT] done");
    Ok(())
}
