use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC candle as returned by a `CandleSource`.
/// Series are always ordered oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time of the candle.
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(open_time: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
        }
    }

    /// Signed body size: `close - open`.
    pub fn body(&self) -> f64 {
        self.close - self.open
    }

    /// Closed above its open. A doji is neither green nor red.
    pub fn is_green(&self) -> bool {
        self.close > self.open
    }

    pub fn is_red(&self) -> bool {
        self.close < self.open
    }
}

/// Per-symbol outcome of one refresh cycle, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    /// Display label of the classification, e.g. "Bearish Engulfing".
    pub signal: String,
    /// RSI rounded to 2 decimals; 0 when undefined.
    pub rsi: f64,
    pub status: String,
    /// CSS colour string derived from the pattern direction and proximity.
    pub color: String,
    /// -1 for errored symbols, 0..=3 otherwise.
    pub score: i32,
    /// Distance in RSI points to the trigger threshold, rounded to 2 decimals.
    pub proximity: f64,
}

impl AnalysisResult {
    pub const ERROR_SCORE: i32 = -1;
    pub const ERROR_COLOR: &'static str = "#ffffff";

    /// The result shape used for every symbol whose analysis failed.
    pub fn error(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            signal: "Error".to_string(),
            rsi: 0.0,
            status: "No data".to_string(),
            color: Self::ERROR_COLOR.to_string(),
            score: Self::ERROR_SCORE,
            proximity: 0.0,
        }
    }

    pub fn is_error(&self) -> bool {
        self.score == Self::ERROR_SCORE
    }
}

/// Ranked results of one completed refresh cycle.
/// Published as a whole and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub results: Vec<AnalysisResult>,
    /// Completion time of the refresh, formatted for display.
    /// Empty until the first refresh has finished.
    pub generated_at: String,
}

impl Snapshot {
    /// Display format of `generated_at`.
    pub const TIMESTAMP_FORMAT: &'static str = "%d.%m.%Y %H:%M";

    pub fn new(results: Vec<AnalysisResult>, generated_at: impl Into<String>) -> Self {
        Self {
            results,
            generated_at: generated_at.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Where candles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Binance public REST API.
    Live,
    /// Recorded series loaded from a JSON file.
    Replay,
}

impl std::fmt::Display for DataMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataMode::Live => write!(f, "live"),
            DataMode::Replay => write!(f, "replay"),
        }
    }
}
