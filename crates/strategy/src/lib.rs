pub mod config;
pub mod patterns;

pub use config::ScanSettings;
pub use patterns::{classify, is_hammer, is_shooting_star};

use chrono::{DateTime, Utc};
use tracing::debug;

use common::{Bar, Error, Result, Signal};

/// The most recently closed bar: second from the newest. The newest bar may
/// still be forming.
pub fn last_closed(bars: &[Bar]) -> Result<&Bar> {
    match bars.len() {
        n if n >= 2 => Ok(&bars[n - 2]),
        n => Err(Error::Analysis(format!(
            "need at least 2 bars to find a closed candle, got {n}"
        ))),
    }
}

/// Derive at most one signal for `pair` from its fetched bars.
pub fn analyze(pair: &str, bars: &[Bar], detected_at: DateTime<Utc>) -> Result<Option<Signal>> {
    let bar = last_closed(bars)?;
    if !bar.is_finite() {
        return Err(Error::Analysis(format!(
            "non-finite prices on bar opened at {}",
            bar.open_time
        )));
    }

    let signal = classify(bar).map(|kind| Signal::new(pair, kind, bar, detected_at));
    debug!(pair, bar_time = %bar.open_time, matched = signal.is_some(), "Analyzed closed bar");
    Ok(signal)
}
