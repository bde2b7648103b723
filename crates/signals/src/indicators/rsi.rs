/// RSI (Relative Strength Index) indicator.
///
/// Gains and losses are smoothed with an exponentially weighted mean using
/// decay `alpha = 1 / period` and adjusted weights, i.e. every observation
/// since the start of the series contributes with weight `(1 - alpha)^age`
/// normalised by the sum of weights. The value therefore depends on the whole
/// history, not only on the last `period` changes.
///
/// A value is defined once `period` price changes have been observed, which
/// needs at least `period + 1` closes.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub const DEFAULT_PERIOD: usize = 14;

    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// RSI aligned to `closes` (oldest first): one entry per close, `None`
    /// where not enough history has been observed yet.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(closes.len());
        if closes.is_empty() {
            return out;
        }
        // The first close has no change.
        out.push(None);

        let decay = 1.0 - 1.0 / self.period as f64;
        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        let mut weight_sum = 0.0;

        for (i, pair) in closes.windows(2).enumerate() {
            let change = pair[1] - pair[0];
            let gain = if change > 0.0 { change } else { 0.0 };
            let loss = if change < 0.0 { -change } else { 0.0 };

            gain_sum = gain_sum * decay + gain;
            loss_sum = loss_sum * decay + loss;
            weight_sum = weight_sum * decay + 1.0;

            let observed = i + 1;
            if observed < self.period {
                out.push(None);
                continue;
            }

            out.push(Some(rsi_from_averages(
                gain_sum / weight_sum,
                loss_sum / weight_sum,
            )));
        }
        out
    }

    /// RSI of the last close. Returns `None` if there are fewer than
    /// `period + 1` values.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        self.series(closes).last().copied().flatten()
    }
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    // No losses in the window: the ratio is unbounded and RSI saturates.
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
