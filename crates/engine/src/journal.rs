use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use common::{Result, Signal, SignalSink, Timeframe};

/// Append-only text log of detected signals, one line per signal.
///
/// The file is opened, written and closed on every call; nothing is kept
/// open between signals and the file is never read back.
pub struct SignalJournal {
    path: PathBuf,
}

impl SignalJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, signal: &Signal) -> Result<()> {
        let line = format_line(signal, Utc::now());

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), pair = %signal.pair, "Signal journaled");
        Ok(())
    }
}

#[async_trait]
impl SignalSink for SignalJournal {
    fn name(&self) -> &str {
        "journal"
    }

    async fn emit(&self, signal: &Signal, _timeframe: Timeframe) -> Result<()> {
        self.append(signal).await
    }
}

/// `[<written>] <pair> | <KIND> | <DIR> | price=<p> | time=<detected>\n`
pub fn format_line(signal: &Signal, written_at: DateTime<Utc>) -> String {
    format!(
        "[{}] {} | {} | {} | price={} | time={}\n",
        written_at.format("%Y-%m-%d %H:%M:%S UTC"),
        signal.pair,
        signal.pattern,
        signal.direction,
        signal.price,
        signal.detected_at.format("%Y-%m-%d %H:%M UTC"),
    )
}
