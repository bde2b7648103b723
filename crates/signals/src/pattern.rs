use serde::{Deserialize, Serialize};

use common::Candle;

/// Direction implied by a classification. Drives the display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

/// Discrete outcome of the candle/RSI evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalKind {
    BearishEngulfing,
    PotentialBearish,
    TwoGreen,
    Watch,
    TwoRed,
    PotentialBullish,
    BullishEngulfing,
    Error,
}

impl SignalKind {
    pub fn label(&self) -> &'static str {
        match self {
            SignalKind::BearishEngulfing => "Bearish Engulfing",
            SignalKind::PotentialBearish => "Potential Bearish",
            SignalKind::TwoGreen => "Two Green Candles",
            SignalKind::Watch => "Neutral",
            SignalKind::TwoRed => "Two Red Candles",
            SignalKind::PotentialBullish => "Potential Bullish",
            SignalKind::BullishEngulfing => "Bullish Engulfing",
            SignalKind::Error => "Error",
        }
    }

    pub fn bias(&self) -> Bias {
        match self {
            SignalKind::BearishEngulfing | SignalKind::PotentialBearish | SignalKind::TwoRed => {
                Bias::Bearish
            }
            SignalKind::BullishEngulfing | SignalKind::PotentialBullish | SignalKind::TwoGreen => {
                Bias::Bullish
            }
            SignalKind::Watch | SignalKind::Error => Bias::Neutral,
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// RSI levels that confirm a reversal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A bearish engulfing is confirmed above this RSI.
    pub bearish: f64,
    /// A bullish engulfing is confirmed below this RSI.
    pub bullish: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            bearish: 60.0,
            bullish: 40.0,
        }
    }
}

/// Result of classifying the last three candles.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: SignalKind,
    /// Human-readable status shown next to the label.
    pub status: String,
    /// Distance in RSI points to the trigger threshold, never negative.
    pub proximity: f64,
}

impl Classification {
    fn new(kind: SignalKind, status: impl Into<String>, proximity: f64) -> Self {
        Self {
            kind,
            status: status.into(),
            proximity,
        }
    }

    pub fn error() -> Self {
        Self::new(SignalKind::Error, "No data", 0.0)
    }

    pub fn bias(&self) -> Bias {
        self.kind.bias()
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Engulfing / consecutive-colour classification of the latest candles.
#[derive(Debug, Clone, Default)]
pub struct PatternClassifier {
    pub thresholds: Thresholds,
}

impl PatternClassifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Classify the last three candles of `candles` (oldest first) against the
    /// current RSI.
    ///
    /// Rules are evaluated in order and the first match wins: reversal
    /// (engulfing) shapes outrank plain two-candle continuation. Fewer than
    /// three candles or an undefined RSI yield `SignalKind::Error`.
    pub fn classify(&self, candles: &[Candle], rsi: Option<f64>) -> Classification {
        let (c3, c2, c1) = match candles {
            [.., c3, c2, c1] => (c3, c2, c1),
            _ => return Classification::error(),
        };
        let rsi = match rsi {
            Some(v) if v.is_finite() => v,
            _ => return Classification::error(),
        };

        let Thresholds { bearish, bullish } = self.thresholds;
        let above_bearish = (rsi - bearish).max(0.0);
        let below_bullish = (bullish - rsi).max(0.0);
        let engulfs = c1.body().abs() > c2.body().abs();

        if c3.is_green() && c2.is_green() && c1.is_red() && engulfs {
            if rsi > bearish {
                Classification::new(SignalKind::BearishEngulfing, "Trade viable (short)", above_bearish)
            } else {
                Classification::new(
                    SignalKind::PotentialBearish,
                    points_to_signal(bearish - rsi),
                    above_bearish,
                )
            }
        } else if c3.is_red() && c2.is_red() && c1.is_green() && engulfs {
            if rsi < bullish {
                Classification::new(SignalKind::BullishEngulfing, "Trade viable (long)", below_bullish)
            } else {
                Classification::new(
                    SignalKind::PotentialBullish,
                    points_to_signal(rsi - bullish),
                    below_bullish,
                )
            }
        } else if c2.is_green() && c1.is_green() {
            Classification::new(SignalKind::TwoGreen, "Could turn bearish soon", below_bullish)
        } else if c2.is_red() && c1.is_red() {
            Classification::new(SignalKind::TwoRed, "Could turn bullish soon", above_bearish)
        } else {
            let leaning = if below_bullish > above_bearish {
                "bullish"
            } else {
                "bearish"
            };
            Classification::new(
                SignalKind::Watch,
                format!("Watching ({leaning})"),
                below_bullish.max(above_bearish),
            )
        }
    }
}

fn points_to_signal(points: f64) -> String {
    format!("{points:.1} points to signal")
}
