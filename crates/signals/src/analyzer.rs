use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use common::{AnalysisResult, Candle, CandleSource};

use crate::config::ScreenerConfig;
use crate::error::AnalysisError;
use crate::indicators::RsiIndicator;
use crate::pattern::{PatternClassifier, SignalKind};
use crate::score::{color_for, score};

/// Minimum number of candles the classifier looks at.
pub const MIN_CANDLES: usize = 3;

/// Runs fetch → RSI → classification → scoring for one symbol.
pub struct Analyzer {
    source: Arc<dyn CandleSource>,
    rsi: RsiIndicator,
    classifier: PatternClassifier,
    interval: String,
    limit: u32,
    fetch_timeout: Duration,
}

impl Analyzer {
    pub fn new(source: Arc<dyn CandleSource>, cfg: &ScreenerConfig) -> Self {
        Self {
            source,
            rsi: RsiIndicator::new(cfg.rsi.period),
            classifier: PatternClassifier::new(cfg.thresholds),
            interval: cfg.interval.clone(),
            limit: cfg.limit,
            fetch_timeout: cfg.fetch_timeout(),
        }
    }

    /// Analyse one symbol. Any failure becomes `AnalysisResult::error`, so a
    /// bad symbol never affects the others.
    pub async fn analyze(&self, symbol: &str) -> AnalysisResult {
        match self.evaluate(symbol).await {
            Ok(result) => result,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Symbol analysis failed");
                AnalysisResult::error(symbol)
            }
        }
    }

    /// Typed variant of `analyze`.
    pub async fn evaluate(&self, symbol: &str) -> Result<AnalysisResult, AnalysisError> {
        let candles = self.fetch(symbol).await?;
        self.assess(symbol, &candles)
    }

    /// Analyse an already fetched series (oldest first).
    pub fn assess(&self, symbol: &str, candles: &[Candle]) -> Result<AnalysisResult, AnalysisError> {
        if candles.len() < MIN_CANDLES {
            return Err(AnalysisError::InsufficientCandles {
                symbol: symbol.to_string(),
                got: candles.len(),
                needed: MIN_CANDLES,
            });
        }
        if let Some(bad) = candles
            .iter()
            .find(|c| !c.open.is_finite() || !c.close.is_finite())
        {
            return Err(AnalysisError::ClassificationFault {
                symbol: symbol.to_string(),
                reason: format!("non-finite price in candle opened at {}", bad.open_time),
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = self
            .rsi
            .compute(&closes)
            .ok_or_else(|| AnalysisError::IndicatorUndefined {
                symbol: symbol.to_string(),
                got: closes.len(),
                needed: self.rsi.period + 1,
            })?;

        let classification = self.classifier.classify(candles, Some(rsi));
        if classification.kind == SignalKind::Error {
            return Err(AnalysisError::ClassificationFault {
                symbol: symbol.to_string(),
                reason: format!("RSI value {rsi} cannot be classified"),
            });
        }

        debug!(
            symbol = %symbol,
            rsi,
            signal = %classification.kind,
            proximity = classification.proximity,
            "Symbol classified"
        );

        Ok(AnalysisResult {
            symbol: symbol.to_string(),
            signal: classification.label().to_string(),
            rsi: round2(rsi),
            color: color_for(classification.bias(), classification.proximity),
            score: score(classification.kind),
            proximity: round2(classification.proximity),
            status: classification.status,
        })
    }

    async fn fetch(&self, symbol: &str) -> Result<Vec<Candle>, AnalysisError> {
        let request = self.source.candles(symbol, &self.interval, self.limit);
        match tokio::time::timeout(self.fetch_timeout, request).await {
            Ok(Ok(candles)) => Ok(candles),
            Ok(Err(e)) => Err(AnalysisError::ProviderUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(AnalysisError::ProviderUnavailable {
                symbol: symbol.to_string(),
                reason: format!("timed out after {:?}", self.fetch_timeout),
            }),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
