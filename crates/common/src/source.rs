use async_trait::async_trait;

use crate::{Candle, Result};

/// Provider of recent candle history.
///
/// `BinanceClient` implements this against the public klines endpoint.
/// `ReplaySource` implements this from in-memory or recorded series.
///
/// Implementations either return the whole series, oldest candle first, or
/// fail. Partial series are never returned.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Fetch at most `limit` of the most recent candles of `interval` for `symbol`.
    async fn candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>>;
}
