pub mod notifier;

pub use notifier::{format_message, TelegramNotifier};
