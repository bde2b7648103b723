use crate::pattern::{Bias, SignalKind};

/// Ordinal signal strength used for ranking.
///
/// Confirmed engulfing 3, two same-coloured candles 2, error -1. An
/// engulfing shape still short of its RSI trigger ranks with watch rows at 0.
pub fn score(kind: SignalKind) -> i32 {
    match kind {
        SignalKind::BearishEngulfing | SignalKind::BullishEngulfing => 3,
        SignalKind::TwoGreen | SignalKind::TwoRed => 2,
        SignalKind::PotentialBearish | SignalKind::PotentialBullish | SignalKind::Watch => 0,
        SignalKind::Error => -1,
    }
}

/// CSS colour for a row. The further from the trigger, the weaker the tone.
pub fn color_for(bias: Bias, proximity: f64) -> String {
    let intensity = ((proximity * 10.0) as i64).clamp(0, 200);
    match bias {
        Bias::Bullish => format!("rgb(50, {}, 50)", 200 - intensity),
        Bias::Bearish => format!("rgb({}, 50, 50)", 200 - intensity),
        Bias::Neutral => {
            let lightness = 30.0 + (proximity * 2.0).clamp(0.0, 40.0);
            format!("hsl(0, 0%, {lightness}%)")
        }
    }
}
