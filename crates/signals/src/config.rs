use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use common::{Error, Result};

use crate::indicators::RsiIndicator;
use crate::pattern::Thresholds;

/// Screener config file (TOML). Every field is optional.
///
/// Example `config/screener.toml`:
/// ```toml
/// symbols = ["BTCUSDT", "ETHUSDT"]
/// interval = "1h"
/// limit = 50
/// refresh_interval_secs = 900
/// fetch_timeout_secs = 10
///
/// [rsi]
/// period = 14
///
/// [thresholds]
/// bearish = 60.0
/// bullish = 40.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Symbols analysed on every refresh, e.g. "BTCUSDT".
    pub symbols: Vec<String>,
    /// Candle interval requested from the source.
    pub interval: String,
    /// Number of candles requested per symbol.
    pub limit: u32,
    pub refresh_interval_secs: u64,
    /// Per-symbol fetch timeout; expiry counts as a fetch failure.
    pub fetch_timeout_secs: u64,
    pub rsi: RsiConfig,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: RsiIndicator::DEFAULT_PERIOD,
        }
    }
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            symbols: ["BTCUSDT", "ETHUSDT", "SOLUSDT", "NEARUSDT", "DOGEUSDT"]
                .into_iter()
                .map(String::from)
                .collect(),
            interval: "1h".to_string(),
            limit: 50,
            refresh_interval_secs: 15 * 60,
            fetch_timeout_secs: 10,
            rsi: RsiConfig::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl ScreenerConfig {
    /// Load from a TOML file. A missing file falls back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Screener config not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(Error::Config("at least one symbol is required".into()));
        }
        if self.rsi.period < 2 {
            return Err(Error::Config(format!(
                "rsi.period must be >= 2, got {}",
                self.rsi.period
            )));
        }
        if self.limit < 3 {
            return Err(Error::Config(format!(
                "limit must be >= 3 to classify candles, got {}",
                self.limit
            )));
        }
        // RSI needs `period` deltas before its first value.
        if (self.limit as usize) <= self.rsi.period {
            return Err(Error::Config(format!(
                "limit ({}) must exceed rsi.period ({}) for RSI to be defined",
                self.limit, self.rsi.period
            )));
        }
        if !self.thresholds.bullish.is_finite() || !self.thresholds.bearish.is_finite() {
            return Err(Error::Config(format!(
                "thresholds must be finite, got bullish {} and bearish {}",
                self.thresholds.bullish, self.thresholds.bearish
            )));
        }
        if self.thresholds.bullish >= self.thresholds.bearish {
            return Err(Error::Config(format!(
                "thresholds.bullish ({}) must be below thresholds.bearish ({})",
                self.thresholds.bullish, self.thresholds.bearish
            )));
        }
        if self.refresh_interval_secs == 0 || self.fetch_timeout_secs == 0 {
            return Err(Error::Config(
                "refresh_interval_secs and fetch_timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
