use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use common::{CandleSource, Result, Signal, SignalSink};
use strategy::ScanSettings;

/// Added to every boundary sleep so the exchange has closed the candle
/// before we ask for it.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(1);

/// Seconds from `now_secs` to the next multiple of `tf_secs`; `0` when
/// `now_secs` is exactly on a boundary.
pub fn seconds_until_boundary(now_secs: u64, tf_secs: u64) -> u64 {
    let rem = now_secs % tf_secs;
    if rem == 0 {
        0
    } else {
        tf_secs - rem
    }
}

/// Wait before the next cycle. Never zero: on a boundary, wait a full
/// timeframe instead.
pub fn next_cycle_wait(now_secs: u64, tf_secs: u64) -> u64 {
    match seconds_until_boundary(now_secs, tf_secs) {
        0 => tf_secs,
        w => w,
    }
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Outcome of one pass over all configured pairs.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub scanned: usize,
    pub signals: Vec<Signal>,
    /// `(pair, error)` for every pair that could not be evaluated.
    pub failures: Vec<(String, String)>,
}

/// Drives the scan: aligns to candle closes, then walks every pair in order,
/// fetching, classifying and notifying. Runs on a single task.
pub struct Scanner {
    settings: ScanSettings,
    source: Arc<dyn CandleSource>,
    sinks: Vec<Box<dyn SignalSink>>,
}

impl Scanner {
    pub fn new(settings: ScanSettings, source: Arc<dyn CandleSource>) -> Self {
        Self {
            settings,
            source,
            sinks: Vec::new(),
        }
    }

    /// Register a signal destination. Sinks are called in registration order.
    pub fn with_sink<S: SignalSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Run forever. Call from the main task; there is no shutdown path other
    /// than process termination.
    pub async fn run(self) {
        let tf = self.settings.timeframe;
        info!(pairs = %self.settings.pairs.join(", "), timeframe = %tf, "Scanner starting");

        let wait = seconds_until_boundary(unix_now(), tf.seconds());
        if wait > 0 {
            info!(seconds = wait, timeframe = %tf, "Aligning to candle boundary");
            tokio::time::sleep(Duration::from_secs(wait) + SAFETY_MARGIN).await;
        }

        loop {
            let report = self.scan_cycle().await;

            let wait = next_cycle_wait(unix_now(), tf.seconds());
            info!(
                scanned = report.scanned,
                signals = report.signals.len(),
                failures = report.failures.len(),
                sleep_secs = wait,
                "Cycle complete"
            );
            tokio::time::sleep(Duration::from_secs(wait) + SAFETY_MARGIN).await;
        }
    }

    /// One pass over every pair. A failing pair is logged and skipped; it
    /// never stops the pairs after it.
    pub async fn scan_cycle(&self) -> CycleReport {
        info!(at = %Utc::now().format("%Y-%m-%d %H:%M:%S UTC"), "Scanning pairs");
        let mut report = CycleReport::default();
        let delay = self.settings.inter_pair_delay();

        for pair in &self.settings.pairs {
            report.scanned += 1;
            match self.scan_pair(pair).await {
                Ok(Some(signal)) => {
                    info!(
                        pair = %pair,
                        pattern = %signal.pattern,
                        direction = %signal.direction,
                        price = signal.price,
                        "SIGNAL"
                    );
                    self.dispatch(&signal).await;
                    report.signals.push(signal);
                }
                Ok(None) => info!(pair = %pair, "No pattern"),
                Err(e) => {
                    warn!(pair = %pair, error = %e, "Pair skipped");
                    report.failures.push((pair.clone(), e.to_string()));
                }
            }

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        report
    }

    /// Fetch and classify a single pair.
    pub async fn scan_pair(&self, pair: &str) -> Result<Option<Signal>> {
        let bars = self
            .source
            .fetch_bars(pair, self.settings.timeframe, self.settings.fetch_limit)
            .await?;
        strategy::analyze(pair, &bars, Utc::now())
    }

    async fn dispatch(&self, signal: &Signal) {
        for sink in &self.sinks {
            if let Err(e) = sink.emit(signal, self.settings.timeframe).await {
                warn!(sink = sink.name(), pair = %signal.pair, error = %e, "Signal delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use common::{Bar, Error, PatternKind, Timeframe};

    fn bar(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        let open_time = Utc.timestamp_opt(1_700_000_100, 0).unwrap() + ChronoDuration::minutes(minute);
        Bar {
            open_time,
            open,
            high,
            low,
            close,
            volume: 1.0,
            close_time: open_time + ChronoDuration::minutes(15),
        }
    }

    fn hammer_series() -> Vec<Bar> {
        vec![
            bar(0, 10.0, 11.5, 9.5, 11.0),
            bar(15, 10.0, 10.25, 9.0, 10.2),
            bar(30, 10.2, 10.3, 10.1, 10.25),
        ]
    }

    fn star_series() -> Vec<Bar> {
        vec![
            bar(0, 10.0, 11.5, 9.5, 11.0),
            bar(15, 10.0, 11.0, 9.75, 9.8),
            bar(30, 9.8, 9.9, 9.7, 9.85),
        ]
    }

    fn plain_series() -> Vec<Bar> {
        vec![bar(0, 10.0, 11.5, 9.5, 11.0), bar(15, 10.0, 11.5, 9.5, 11.0)]
    }

    /// In-memory source; pairs without an entry fail like a network error.
    #[derive(Default)]
    struct FakeSource {
        bars: HashMap<String, Vec<Bar>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn with(mut self, pair: &str, bars: Vec<Bar>) -> Self {
            self.bars.insert(pair.to_string(), bars);
            self
        }
    }

    #[async_trait]
    impl CandleSource for FakeSource {
        async fn fetch_bars(&self, pair: &str, _tf: Timeframe, limit: usize) -> Result<Vec<Bar>> {
            self.calls.lock().unwrap().push(pair.to_string());
            let bars = self
                .bars
                .get(pair)
                .ok_or_else(|| Error::Fetch(format!("connection reset for {pair}")))?;
            let skip = bars.len().saturating_sub(limit);
            Ok(bars[skip..].to_vec())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<Signal>>>,
    }

    #[async_trait]
    impl SignalSink for RecordingSink {
        fn name(&self) -> &str {
            "recording"
        }

        async fn emit(&self, signal: &Signal, _tf: Timeframe) -> Result<()> {
            self.seen.lock().unwrap().push(signal.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl SignalSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        async fn emit(&self, _signal: &Signal, _tf: Timeframe) -> Result<()> {
            Err(Error::Notify("HTTP 502".into()))
        }
    }

    fn settings(pairs: &[&str]) -> ScanSettings {
        ScanSettings {
            pairs: pairs.iter().map(|p| p.to_string()).collect(),
            inter_pair_delay_secs: 0.0,
            ..ScanSettings::default()
        }
    }

    #[test]
    fn boundary_math() {
        assert_eq!(seconds_until_boundary(900, 900), 0);
        assert_eq!(seconds_until_boundary(901, 900), 899);
        assert_eq!(seconds_until_boundary(1799, 900), 1);
        assert_eq!(next_cycle_wait(900, 900), 900);
        assert_eq!(next_cycle_wait(1000, 900), 800);
    }

    #[tokio::test]
    async fn fetch_failure_does_not_stop_later_pairs() {
        let source = Arc::new(
            FakeSource::default()
                .with("ETH/USDT", plain_series())
                .with("SOL/USDT", hammer_series()),
        );
        let sink = RecordingSink::default();
        let scanner = Scanner::new(settings(&["ETH/USDT", "BCH/USDT", "SOL/USDT"]), source.clone())
            .with_sink(sink.clone());

        let report = scanner.scan_cycle().await;

        assert_eq!(
            *source.calls.lock().unwrap(),
            vec!["ETH/USDT", "BCH/USDT", "SOL/USDT"]
        );
        assert_eq!(report.scanned, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "BCH/USDT");
        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].pair, "SOL/USDT");
        assert_eq!(sink.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn analysis_failure_is_isolated() {
        // A single bar has no closed candle before it.
        let source = Arc::new(
            FakeSource::default()
                .with("ETH/USDT", vec![bar(0, 10.0, 11.0, 9.0, 10.5)])
                .with("SOL/USDT", star_series()),
        );
        let scanner = Scanner::new(settings(&["ETH/USDT", "SOL/USDT"]), source);

        let report = scanner.scan_cycle().await;
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].1.contains("Analysis"));
        assert_eq!(report.signals.len(), 1);
        assert_eq!(report.signals[0].pattern, PatternKind::ShootingStar);
    }

    #[tokio::test]
    async fn notifier_failure_still_reaches_later_sinks() {
        let source = Arc::new(FakeSource::default().with("ETH/USDT", hammer_series()));
        let journal = RecordingSink::default();
        let scanner = Scanner::new(settings(&["ETH/USDT"]), source)
            .with_sink(FailingSink)
            .with_sink(journal.clone());

        let report = scanner.scan_cycle().await;

        assert_eq!(report.signals.len(), 1);
        let seen = journal.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].pattern, PatternKind::Hammer);
        assert_eq!(seen[0].price, 10.2);
    }

    #[tokio::test]
    async fn at_most_one_signal_per_pair() {
        let source = Arc::new(
            FakeSource::default()
                .with("ETH/USDT", hammer_series())
                .with("SOL/USDT", star_series())
                .with("LINK/USDT", plain_series()),
        );
        let scanner = Scanner::new(settings(&["ETH/USDT", "SOL/USDT", "LINK/USDT"]), source);

        let report = scanner.scan_cycle().await;
        let pairs: Vec<&str> = report.signals.iter().map(|s| s.pair.as_str()).collect();
        assert_eq!(pairs, vec!["ETH/USDT", "SOL/USDT"]);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn scan_pair_respects_fetch_limit() {
        // Only the last two bars are returned, so the closed bar is the hammer.
        let mut bars = star_series();
        bars.extend(hammer_series());
        let source = Arc::new(FakeSource::default().with("ETH/USDT", bars));
        let scanner = Scanner::new(
            ScanSettings {
                fetch_limit: 2,
                ..settings(&["ETH/USDT"])
            },
            source,
        );

        let signal = scanner.scan_pair("ETH/USDT").await.unwrap().unwrap();
        assert_eq!(signal.pattern, PatternKind::Hammer);
    }
}
