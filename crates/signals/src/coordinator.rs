use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use futures_util::future::join_all;
use tracing::info;

use common::{AnalysisResult, CandleSource, Snapshot};

use crate::analyzer::Analyzer;
use crate::config::ScreenerConfig;
use crate::snapshot::{SnapshotReader, SnapshotStore};

/// Runs one refresh cycle over all configured symbols and publishes the
/// ranked result. Owns the `SnapshotStore`; it is the only writer.
pub struct RefreshCoordinator {
    analyzer: Analyzer,
    symbols: Vec<String>,
    store: SnapshotStore,
}

impl RefreshCoordinator {
    pub fn new(source: Arc<dyn CandleSource>, cfg: &ScreenerConfig) -> Self {
        Self {
            analyzer: Analyzer::new(source, cfg),
            symbols: cfg.symbols.clone(),
            store: SnapshotStore::new(),
        }
    }

    /// Read-only handle for the presentation layer.
    pub fn reader(&self) -> SnapshotReader {
        self.store.reader()
    }

    /// Analyse every symbol, drop failures, rank, and publish.
    ///
    /// Symbols are analysed concurrently. Errored symbols are left out of the
    /// snapshot; a cycle where every symbol fails publishes an empty one.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        info!(symbols = self.symbols.len(), "Starting refresh");
        let started = Instant::now();

        let results = join_all(self.symbols.iter().map(|s| self.analyzer.analyze(s))).await;
        let analysed = results.len();
        let ranked = rank(results);

        let generated_at = Local::now().format(Snapshot::TIMESTAMP_FORMAT).to_string();
        let snapshot = self.store.publish(Snapshot::new(ranked, generated_at)).await;

        info!(
            ranked = snapshot.len(),
            dropped = analysed - snapshot.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            generated_at = %snapshot.generated_at,
            "Refresh complete"
        );
        snapshot
    }
}

/// Drop errored results and order the rest by score, then proximity, both
/// descending. The sort is stable, so remaining ties keep their input order.
pub fn rank(results: Vec<AnalysisResult>) -> Vec<AnalysisResult> {
    let mut ranked: Vec<AnalysisResult> = results.into_iter().filter(|r| !r.is_error()).collect();
    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.proximity.total_cmp(&a.proximity))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use common::Candle;
    use replay::ReplaySource;

    use crate::pattern::{PatternClassifier, Thresholds};
    use crate::score::score;

    /// Never answers for one symbol; serves the rest from replay data.
    struct StalledSource {
        inner: ReplaySource,
        stalled: &'static str,
    }

    #[async_trait]
    impl CandleSource for StalledSource {
        async fn candles(&self, symbol: &str, interval: &str, limit: u32) -> common::Result<Vec<Candle>> {
            if symbol == self.stalled {
                std::future::pending::<()>().await;
            }
            self.inner.candles(symbol, interval, limit).await
        }
    }

    fn shape(bodies: &[(f64, f64)]) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        bodies
            .iter()
            .enumerate()
            .map(|(i, &(open, close))| {
                Candle::new(start + ChronoDuration::hours(i as i64), open, open.max(close), open.min(close), close)
            })
            .collect()
    }

    fn classified(symbol: &str, candles: &[Candle], rsi: f64) -> AnalysisResult {
        let c = PatternClassifier::new(Thresholds::default()).classify(candles, Some(rsi));
        AnalysisResult {
            symbol: symbol.into(),
            signal: c.label().to_string(),
            rsi,
            status: c.status.clone(),
            color: String::new(),
            score: score(c.kind),
            proximity: c.proximity,
        }
    }

    fn result(symbol: &str, score: i32, proximity: f64) -> AnalysisResult {
        AnalysisResult {
            symbol: symbol.into(),
            signal: String::new(),
            rsi: 50.0,
            status: String::new(),
            color: String::new(),
            score,
            proximity,
        }
    }

    fn symbols(results: &[AnalysisResult]) -> Vec<&str> {
        results.iter().map(|r| r.symbol.as_str()).collect()
    }

    fn trend(step: f64, n: usize) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let open = 100.0 + i as f64 * step;
                let close = open + step;
                Candle::new(
                    start + ChronoDuration::hours(i as i64),
                    open,
                    open.max(close),
                    open.min(close),
                    close,
                )
            })
            .collect()
    }

    fn config(symbols: &[&str]) -> ScreenerConfig {
        ScreenerConfig {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            ..ScreenerConfig::default()
        }
    }

    #[test]
    fn rank_orders_by_score_then_proximity() {
        let ranked = rank(vec![
            result("A", 0, 9.0),
            result("B", 3, 1.0),
            result("C", 2, 4.0),
            result("D", 3, 5.0),
            result("E", 2, 7.5),
        ]);
        assert_eq!(symbols(&ranked), vec!["D", "B", "E", "C", "A"]);
    }

    #[test]
    fn rank_drops_errors_and_keeps_tie_order() {
        let ranked = rank(vec![
            result("A", 1, 0.0),
            AnalysisResult::error("X"),
            result("B", 1, 0.0),
            result("C", 1, 0.0),
        ]);
        assert_eq!(symbols(&ranked), vec!["A", "B", "C"]);
    }

    #[test]
    fn potential_engulfing_ranks_with_watch_rows_by_proximity() {
        // Bearish engulfing shape, but RSI has not crossed 60.
        let potential = classified("POTUSDT", &shape(&[(10.0, 11.0), (11.0, 12.0), (12.0, 9.0)]), 55.0);
        assert_eq!(potential.signal, "Potential Bearish");
        assert_eq!(potential.score, 0);

        // Green, red, green: no rule matches, deep in oversold territory.
        let watch = classified("WATCHUSDT", &shape(&[(10.0, 11.0), (11.0, 10.0), (10.0, 10.5)]), 25.0);
        assert_eq!(watch.score, 0);
        assert_eq!(watch.proximity, 15.0);

        let ranked = rank(vec![potential, watch]);
        assert_eq!(symbols(&ranked), vec!["WATCHUSDT", "POTUSDT"]);
    }

    #[tokio::test]
    async fn stalled_symbol_does_not_hold_back_the_others() {
        let inner = ReplaySource::new();
        inner.insert("UPUSDT", trend(1.0, 40)).await;
        inner.insert("DOWNUSDT", trend(-1.0, 40)).await;
        let source = StalledSource {
            inner,
            stalled: "STALLUSDT",
        };
        let cfg = ScreenerConfig {
            fetch_timeout_secs: 1,
            ..config(&["STALLUSDT", "UPUSDT", "DOWNUSDT"])
        };
        let coordinator = RefreshCoordinator::new(Arc::new(source), &cfg);

        let snapshot = tokio::time::timeout(Duration::from_secs(5), coordinator.refresh())
            .await
            .expect("refresh blocked on the stalled symbol");

        assert_eq!(symbols(&snapshot.results), vec!["UPUSDT", "DOWNUSDT"]);
        assert_eq!(*coordinator.reader().current().await, *snapshot);
    }

    #[tokio::test]
    async fn refresh_publishes_ranked_snapshot() {
        let source = ReplaySource::new();
        // Steady uptrend → two green candles; steady downtrend → two red.
        source.insert("UPUSDT", trend(1.0, 40)).await;
        source.insert("DOWNUSDT", trend(-1.0, 40)).await;
        let coordinator =
            RefreshCoordinator::new(Arc::new(source), &config(&["UPUSDT", "MISSING", "DOWNUSDT"]));
        let reader = coordinator.reader();

        let snapshot = coordinator.refresh().await;

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.results.iter().all(|r| r.score == 2));
        assert!(!snapshot.generated_at.is_empty());
        // Both sit on the wrong side of their trigger (proximity 0): config order wins.
        assert_eq!(symbols(&snapshot.results), vec!["UPUSDT", "DOWNUSDT"]);
        assert_eq!(*reader.current().await, *snapshot);
    }

    #[tokio::test]
    async fn fully_failed_cycle_publishes_empty_snapshot() {
        let coordinator =
            RefreshCoordinator::new(Arc::new(ReplaySource::new()), &config(&["A", "B"]));
        let snapshot = coordinator.refresh().await;
        assert!(snapshot.is_empty());
        assert!(!snapshot.generated_at.is_empty());
        assert!(coordinator.reader().current().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_is_idempotent_for_unchanged_data() {
        let source = ReplaySource::new();
        source.insert("UPUSDT", trend(0.5, 30)).await;
        source.insert("DOWNUSDT", trend(-0.5, 30)).await;
        let coordinator =
            RefreshCoordinator::new(Arc::new(source), &config(&["UPUSDT", "DOWNUSDT"]));

        let first = coordinator.refresh().await;
        let second = coordinator.refresh().await;
        assert_eq!(first.results, second.results);
    }
}
