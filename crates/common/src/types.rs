use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::Error;

/// One OHLCV candle as returned by the exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
}

impl Bar {
    /// Absolute distance between open and close.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Distance from the top of the body to the high.
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Distance from the bottom of the body to the low.
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Candlestick shape recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Hammer,
    ShootingStar,
}

impl PatternKind {
    /// Trade bias implied by the reversal shape.
    pub fn direction(&self) -> Direction {
        match self {
            PatternKind::Hammer => Direction::Long,
            PatternKind::ShootingStar => Direction::Short,
        }
    }

    /// Human-readable title used in chat messages.
    pub fn title(&self) -> &'static str {
        match self {
            PatternKind::Hammer => "Hammer",
            PatternKind::ShootingStar => "Shooting Star",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternKind::Hammer => write!(f, "HAMMER"),
            PatternKind::ShootingStar => write!(f, "SHOOTING_STAR"),
        }
    }
}

/// Trade direction suggested by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// A detected pattern on the last closed bar of a pair.
/// Built once per match and only ever rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub pattern: PatternKind,
    pub direction: Direction,
    /// Close of the analysed bar.
    pub price: f64,
    pub pair: String,
    pub detected_at: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        pair: impl Into<String>,
        pattern: PatternKind,
        bar: &Bar,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            pattern,
            direction: pattern.direction(),
            price: bar.close,
            pair: pair.into(),
            detected_at,
        }
    }
}

/// Candle interval. Only intervals whose boundaries line up with the Unix
/// epoch are supported, so `now % seconds` finds the next candle close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Timeframe {
    M1,
    M3,
    M5,
    M15,
    M30,
    H1,
    H2,
    H4,
    H6,
    H8,
    H12,
    D1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 12] = [
        Timeframe::M1,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::H6,
        Timeframe::H8,
        Timeframe::H12,
        Timeframe::D1,
    ];

    /// Binance interval string, e.g. `"15m"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H8 => "8h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
        }
    }

    pub fn seconds(&self) -> u64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M3 => 3 * 60,
            Timeframe::M5 => 5 * 60,
            Timeframe::M15 => 15 * 60,
            Timeframe::M30 => 30 * 60,
            Timeframe::H1 => 3600,
            Timeframe::H2 => 2 * 3600,
            Timeframe::H4 => 4 * 3600,
            Timeframe::H6 => 6 * 3600,
            Timeframe::H8 => 8 * 3600,
            Timeframe::H12 => 12 * 3600,
            Timeframe::D1 => 24 * 3600,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unsupported timeframe '{s}'")))
    }
}

impl TryFrom<String> for Timeframe {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
