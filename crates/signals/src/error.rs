use thiserror::Error;

/// Why a single symbol could not be analysed.
///
/// Produced by `Analyzer::evaluate` and converted into an error result at the
/// `Analyzer::analyze` boundary; never propagates past one symbol.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Candle fetch failed or timed out.
    #[error("{symbol}: candle source unavailable: {reason}")]
    ProviderUnavailable { symbol: String, reason: String },

    /// The source answered with too few candles to classify.
    #[error("{symbol}: only {got} candles, need at least {needed}")]
    InsufficientCandles {
        symbol: String,
        got: usize,
        needed: usize,
    },

    /// Not enough history for the smoothed RSI averages.
    #[error("{symbol}: RSI undefined with {got} closes, need at least {needed}")]
    IndicatorUndefined {
        symbol: String,
        got: usize,
        needed: usize,
    },

    /// Computation produced values the classifier cannot work with.
    #[error("{symbol}: classification failed: {reason}")]
    ClassificationFault { symbol: String, reason: String },
}
