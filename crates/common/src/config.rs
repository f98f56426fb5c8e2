/// Process configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: String,
    pub telegram_chat_id: String,

    // Optional TOML file with pairs, timeframe and scan cadence.
    // Built-in defaults apply when unset.
    pub scan_config_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            telegram_token: required_env("TELEGRAM_TOKEN"),
            telegram_chat_id: required_env("TELEGRAM_CHAT_ID"),
            scan_config_path: optional_env("SCAN_CONFIG_PATH").filter(|p| !p.trim().is_empty()),
        }
    }
}

fn required_env(key: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => panic!("Required environment variable '{key}' is not set. Check your .env file."),
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
