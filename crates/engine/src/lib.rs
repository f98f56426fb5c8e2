pub mod binance;
pub mod journal;
pub mod scanner;

pub use binance::BinanceClient;
pub use journal::SignalJournal;
pub use scanner::{next_cycle_wait, seconds_until_boundary, CycleReport, Scanner};
