use crate::config::FeedConfig;
use crate::errors::{AppError, Result};
use crate::feed::FeedMessage;
use crate::models::{DiffChange, Price, PriceLevel, Side, Size, Snapshot, Update};
use futures::{SinkExt, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

const LEVEL2_CHANNEL: &str = "level2";

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireMsg {
    #[serde(rename = "snapshot")]
    Snapshot {
        product_id: String,
        bids: Vec<[String; 2]>,
        asks: Vec<[String; 2]>,
    },
    #[serde(rename = "l2update")]
    L2Update {
        product_id: String,
        changes: Vec<[String; 3]>,
        time: String,
    },
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(default)]
        reason: Option<String>,
    },
    #[serde(other)]
    Other,
}

/// Subscription payload for the level-2 channel of one product.
pub fn subscribe_request(product_id: &str) -> String {
    json!({
        "type": "subscribe",
        "product_ids": [product_id],
        "channels": [LEVEL2_CHANNEL],
    })
    .to_string()
}

fn parse_level(raw: &[String; 2]) -> Option<PriceLevel> {
    let price: Price = raw[0].parse().ok()?;
    let size: Size = raw[1].parse().ok()?;
    Some(PriceLevel::new(price, size))
}

fn parse_change(raw: &[String; 3]) -> Option<DiffChange> {
    let side: Side = raw[0].parse().ok()?;
    let price: Price = raw[1].parse().ok()?;
    let size: Size = raw[2].parse().ok()?;
    Some(DiffChange::new(side, price, size))
}

fn parse_levels(product_id: &str, raw: &[[String; 2]]) -> Vec<PriceLevel> {
    raw.iter()
        .filter_map(|lvl| {
            let parsed = parse_level(lvl);
            if parsed.is_none() {
                warn!(product_id = %product_id, level = ?lvl, "[FEED] dropping unparseable snapshot level");
            }
            parsed
        })
        .collect()
}

/// Decode one text frame. Control frames (`subscriptions`, `heartbeat`, ...)
/// yield `Ok(None)`; an exchange `error` frame is an error.
pub fn parse_message(text: &str) -> Result<Option<FeedMessage>> {
    let msg: WireMsg = serde_json::from_str(text)?;
    match msg {
        WireMsg::Snapshot {
            product_id,
            bids,
            asks,
        } => Ok(Some(FeedMessage::Snapshot(Snapshot {
            bids: parse_levels(&product_id, &bids),
            asks: parse_levels(&product_id, &asks),
        }))),
        WireMsg::L2Update {
            product_id,
            changes,
            time,
        } => {
            let changes = changes
                .iter()
                .filter_map(|raw| {
                    let parsed = parse_change(raw);
                    if parsed.is_none() {
                        warn!(product_id = %product_id, change = ?raw, "[FEED] dropping unparseable change");
                    }
                    parsed
                })
                .collect();
            Ok(Some(FeedMessage::Update(Update {
                changes,
                timestamp: time,
            })))
        }
        WireMsg::Error { message, reason } => Err(AppError::Feed(match reason {
            Some(reason) => format!("{message}: {reason}"),
            None => message,
        })),
        WireMsg::Other => Ok(None),
    }
}

/// Connects, subscribes, and returns the decoded message stream for one product.
pub async fn connect_and_stream(config: FeedConfig) -> Result<impl Stream<Item = FeedMessage>> {
    let (mut ws_stream, _resp) = connect_async(config.ws_url.as_str()).await?;
    info!(url = %config.ws_url, product_id = %config.product_id, "[FEED] connected");

    ws_stream
        .send(Message::Text(subscribe_request(&config.product_id)))
        .await?;

    let mapped = ws_stream.filter_map(|msg_res| async move {
        match msg_res {
            Ok(msg) if msg.is_text() => {
                let txt = match msg.into_text() {
                    Ok(t) => t,
                    Err(e) => {
                        warn!(error = %e, "[FEED] text extraction failed");
                        return None;
                    }
                };
                match parse_message(&txt) {
                    Ok(Some(parsed)) => Some(parsed),
                    Ok(None) => {
                        debug!("[FEED] control frame skipped");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "[FEED] frame rejected");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "[FEED] websocket message error");
                None
            }
            _ => None,
        }
    });
    Ok(mapped)
}
