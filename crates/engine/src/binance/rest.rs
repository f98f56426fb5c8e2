use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use common::{Bar, CandleSource, Error, Result, Timeframe};

const BASE_URL: &str = "https://api.binance.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for Binance public market data. No credentials needed.
pub struct BinanceClient {
    base_url: String,
    http: Client,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: BASE_URL.to_string(),
            http,
        })
    }

    /// Point the client at another host (a mock server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// "ETH/USDT" -> "ETHUSDT"
    pub fn exchange_symbol(pair: &str) -> String {
        pair.replace('/', "").to_uppercase()
    }

    async fn public_get(&self, path: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Fetch(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn fetch_bars(&self, pair: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Bar>> {
        let symbol = Self::exchange_symbol(pair);
        debug!(pair, symbol = %symbol, interval = %timeframe, limit, "Fetching klines");

        let body = self
            .public_get(
                "/api/v3/klines",
                &[
                    ("symbol", symbol),
                    ("interval", timeframe.as_str().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        parse_klines(&body)
    }
}

// ─── Kline JSON parsing ──────────────────────────────────────────────────────

/// Rows are `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
/// Only the first seven columns are read; anything after them is ignored.
fn parse_klines(body: &str) -> Result<Vec<Bar>> {
    let rows: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| Error::Fetch(format!("malformed klines: {e}")))?;

    rows.iter()
        .map(|row| {
            if row.len() < 7 {
                return Err(Error::Fetch(format!(
                    "kline row has {} columns, expected at least 7",
                    row.len()
                )));
            }
            Ok(Bar {
                open_time: timestamp(&row[0])?,
                open: price(&row[1])?,
                high: price(&row[2])?,
                low: price(&row[3])?,
                close: price(&row[4])?,
                volume: price(&row[5])?,
                close_time: timestamp(&row[6])?,
            })
        })
        .collect()
}

fn price(v: &Value) -> Result<f64> {
    v.as_str()
        .ok_or_else(|| Error::Fetch(format!("expected decimal string, got {v}")))
        .and_then(parse_price)
}

fn parse_price(s: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|e| Error::Fetch(format!("bad decimal '{s}': {e}")))
}

fn timestamp(v: &Value) -> Result<DateTime<Utc>> {
    v.as_i64()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or_else(|| Error::Fetch(format!("bad kline timestamp {v}")))
}
