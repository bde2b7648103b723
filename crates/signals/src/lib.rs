pub mod analyzer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod indicators;
pub mod pattern;
pub mod score;
pub mod snapshot;

pub use analyzer::Analyzer;
pub use config::{RsiConfig, ScreenerConfig};
pub use coordinator::{rank, RefreshCoordinator};
pub use error::AnalysisError;
pub use indicators::RsiIndicator;
pub use pattern::{Bias, Classification, PatternClassifier, SignalKind, Thresholds};
pub use snapshot::{SnapshotReader, SnapshotStore};
