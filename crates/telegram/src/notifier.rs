use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use common::{Error, PatternKind, Result, Signal, SignalSink, Timeframe};

const API_URL: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts signal alerts to a Telegram chat through the Bot API.
///
/// One attempt per signal. Failures come back as `Error::Notify` for the
/// caller to log; nothing is retried.
pub struct TelegramNotifier {
    token: String,
    chat_id: String,
    api_url: String,
    http: Client,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            token: token.into(),
            chat_id: chat_id.into(),
            api_url: API_URL.to_string(),
            http,
        })
    }

    /// Point the notifier at another host (a mock server in tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send an HTML-formatted message to the configured chat.
    pub async fn send(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        let resp = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Notify(e.without_url().to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Notify(format!("HTTP {status}: {body}")));
        }

        debug!(chat_id = %self.chat_id, "Telegram message delivered");
        Ok(())
    }
}

#[async_trait]
impl SignalSink for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn emit(&self, signal: &Signal, timeframe: Timeframe) -> Result<()> {
        let text = format_message(signal, timeframe);
        self.send(&text).await?;
        info!(pair = %signal.pair, pattern = %signal.pattern, "Telegram alert sent");
        Ok(())
    }
}

/// Render a signal as the chat alert text.
pub fn format_message(signal: &Signal, timeframe: Timeframe) -> String {
    let emoji = match signal.pattern {
        PatternKind::Hammer => "🟢",
        PatternKind::ShootingStar => "🔴",
    };
    format!(
        "{emoji} <b>{} detected</b>\n\
         Pair: {}\n\
         Direction: {}\n\
         Price: {}\n\
         TF: {timeframe}\n\
         Time: {}",
        signal.pattern.title(),
        signal.pair,
        signal.direction,
        signal.price,
        signal.detected_at.format("%Y-%m-%d %H:%M UTC"),
    )
}
