use std::time::Duration;

use serde::Deserialize;

use common::{Error, Result, Timeframe};

/// Scan settings file (TOML). Every field is optional.
///
/// Example `config/scanner.toml`:
/// ```toml
/// pairs = ["ETH/USDT", "SOL/USDT"]
/// timeframe = "15m"
/// fetch_limit = 10
/// inter_pair_delay_secs = 1.0
/// log_path = "signals.log"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSettings {
    /// Pairs in `BASE/QUOTE` form, scanned in this order every cycle.
    pub pairs: Vec<String>,
    pub timeframe: Timeframe,
    /// Bars requested per fetch. At least two: the newest may still be open.
    pub fetch_limit: usize,
    /// Pause after each pair to go easy on the exchange API.
    pub inter_pair_delay_secs: f64,
    /// Append-only signal log.
    pub log_path: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            pairs: ["ETH/USDT", "BCH/USDT", "SOL/USDT", "TON/USDT", "LINK/USDT"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeframe: Timeframe::M15,
            fetch_limit: 10,
            inter_pair_delay_secs: 1.0,
            log_path: "signals.log".to_string(),
        }
    }
}

impl ScanSettings {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read scan config at '{path}': {e}")
        });
        Self::from_toml_str(&content).unwrap_or_else(|e| {
            panic!("Invalid scan config at '{path}': {e}")
        })
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: ScanSettings =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(Error::Config("at least one pair is required".into()));
        }
        if let Some(p) = self.pairs.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::Config(format!("invalid pair symbol '{p}'")));
        }
        if self.fetch_limit < 2 {
            return Err(Error::Config(format!(
                "fetch_limit must be at least 2, got {}",
                self.fetch_limit
            )));
        }
        if let Err(e) = Duration::try_from_secs_f64(self.inter_pair_delay_secs) {
            return Err(Error::Config(format!(
                "inter_pair_delay_secs must be a non-negative duration, got {}: {e}",
                self.inter_pair_delay_secs
            )));
        }
        Ok(())
    }

    pub fn inter_pair_delay(&self) -> Duration {
        Duration::from_secs_f64(self.inter_pair_delay_secs)
    }
}
