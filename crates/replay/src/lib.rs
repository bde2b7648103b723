use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{Candle, CandleSource, Error, Result};

/// Candle source backed by recorded series instead of the exchange.
///
/// Used for offline runs (`DATA_MODE=replay`) and tests. Symbols without a
/// recorded series fail like an unreachable exchange would.
#[derive(Clone, Default)]
pub struct ReplaySource {
    /// Recorded candles per symbol, oldest first.
    series: Arc<RwLock<HashMap<String, Vec<Candle>>>>,
    /// Artificial delay applied to every fetch.
    latency: Option<Duration>,
}

impl ReplaySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load series from a JSON object mapping symbol → array of candles.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let series: HashMap<String, Vec<Candle>> = serde_json::from_slice(&content)?;
        info!(
            path = %path.display(),
            symbols = series.len(),
            "ReplaySource loaded"
        );
        Ok(Self {
            series: Arc::new(RwLock::new(series)),
            latency: None,
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Set or replace the recorded series for a symbol.
    pub async fn insert(&self, symbol: &str, candles: Vec<Candle>) {
        self.series.write().await.insert(symbol.to_string(), candles);
    }

    /// Recorded symbols, sorted.
    pub async fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.series.read().await.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

#[async_trait]
impl CandleSource for ReplaySource {
    async fn candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let series = self.series.read().await;
        let candles = series
            .get(symbol)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_string()))?;

        let skip = candles.len().saturating_sub(limit as usize);
        debug!(
            symbol = %symbol,
            interval = %interval,
            returned = candles.len() - skip,
            "Replay candles served"
        );
        Ok(candles[skip..].to_vec())
    }
}
