use async_trait::async_trait;

use crate::{Bar, Result, Signal, Timeframe};

/// Source of recent candles for a pair.
///
/// `BinanceClient` implements this against the public REST API.
/// Tests substitute in-memory sources.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch at most `limit` bars, ordered oldest to newest. The newest bar
    /// may still be forming; the one before it is the last closed bar.
    async fn fetch_bars(&self, pair: &str, timeframe: Timeframe, limit: usize) -> Result<Vec<Bar>>;
}

/// A best-effort destination for detected signals (chat message, log file).
///
/// The scanner calls every sink for every signal and only logs failures.
#[async_trait]
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    async fn emit(&self, signal: &Signal, timeframe: Timeframe) -> Result<()>;
}
