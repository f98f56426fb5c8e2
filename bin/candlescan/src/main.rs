use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use common::Config;
use engine::{BinanceClient, Scanner, SignalJournal};
use strategy::ScanSettings;
use telegram_notify::TelegramNotifier;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    let settings = match cfg.scan_config_path.as_deref() {
        Some(path) => {
            info!(path, "Loading scan settings");
            ScanSettings::load(path)
        }
        None => {
            info!("SCAN_CONFIG_PATH not set, using built-in scan settings");
            ScanSettings::default()
        }
    };
    info!(
        pairs = %settings.pairs.join(", "),
        timeframe = %settings.timeframe,
        fetch_limit = settings.fetch_limit,
        log_path = %settings.log_path,
        "Candlescan starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let market = BinanceClient::new()
        .unwrap_or_else(|e| panic!("Failed to create Binance client: {e}"));
    let telegram = TelegramNotifier::new(&cfg.telegram_token, &cfg.telegram_chat_id)
        .unwrap_or_else(|e| panic!("Failed to create Telegram notifier: {e}"));
    let journal = SignalJournal::new(&settings.log_path);

    // ── Scanner ───────────────────────────────────────────────────────────────
    // Telegram first, then the log file: a failed post never skips the log line.
    let scanner = Scanner::new(settings, Arc::new(market))
        .with_sink(telegram)
        .with_sink(journal);

    scanner.run().await;
}
