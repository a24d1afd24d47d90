//! Configuration loader and application settings.

use crate::errors::{AppError, Result};
use std::str::FromStr;
use url::Url;

const DEFAULT_FEED_WS_URL: &str = "wss://ws-feed.exchange.coinbase.com";
const DEFAULT_PRODUCT_ID: &str = "BTC-USD";
const DEFAULT_CROSS_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_HEARTBEAT_SECS: u64 = 5;

/// Where to connect and which instrument to follow.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket endpoint of the exchange public feed.
    pub ws_url: Url,
    /// Product symbol (e.g., "BTC-USD").
    pub product_id: String,
}

/// Consolidated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feed: FeedConfig,
    /// Buffer between the book writer and the cross sink.
    pub cross_channel_capacity: usize,
    /// Interval of the top-of-book heartbeat log; 0 disables it.
    pub heartbeat_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn load() -> Result<Self> {
        let ws_url = Url::parse(&env_or("FEED_WS_URL", DEFAULT_FEED_WS_URL))?;
        if !matches!(ws_url.scheme(), "ws" | "wss") {
            return Err(AppError::Config(format!(
                "FEED_WS_URL must be a ws:// or wss:// URL, got {ws_url}"
            )));
        }

        let product_id = env_or("PRODUCT_ID", DEFAULT_PRODUCT_ID);
        if product_id.trim().is_empty() {
            return Err(AppError::Config("PRODUCT_ID must not be empty".into()));
        }

        let cross_channel_capacity =
            env_parse("CROSS_CHANNEL_CAPACITY", DEFAULT_CROSS_CHANNEL_CAPACITY)?;
        if cross_channel_capacity == 0 {
            return Err(AppError::Config(
                "CROSS_CHANNEL_CAPACITY must be greater than zero".into(),
            ));
        }

        let heartbeat_secs = env_parse("HEARTBEAT_SECS", DEFAULT_HEARTBEAT_SECS)?;

        Ok(Self {
            feed: FeedConfig { ws_url, product_id },
            cross_channel_capacity,
            heartbeat_secs,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has invalid value {raw:?}"))),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_falls_back_when_unset() {
        let v: u64 = env_parse("OBX_TEST_SURELY_UNSET_VAR", 7).expect("default");
        assert_eq!(v, 7);
    }

    #[test]
    fn default_feed_url_is_a_websocket() {
        let url = Url::parse(DEFAULT_FEED_WS_URL).expect("valid default");
        assert_eq!(url.scheme(), "wss");
        assert_eq!(url.host_str(), Some("ws-feed.exchange.coinbase.com"));
    }
}
