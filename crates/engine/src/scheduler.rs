use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};

use signals::RefreshCoordinator;

/// Commands accepted by the scheduler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Run a refresh immediately, outside the regular cadence.
    RefreshNow,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Waiting for the next tick or command.
    #[default]
    Idle,
    Refreshing,
    Stopped,
}

impl std::fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "idle"),
            SchedulerState::Refreshing => write!(f, "refreshing"),
            SchedulerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Cloneable handle passed to the dashboard.
#[derive(Clone)]
pub struct SchedulerHandle {
    command_tx: mpsc::Sender<SchedulerCommand>,
    state: Arc<RwLock<SchedulerState>>,
}

impl SchedulerHandle {
    /// Queue an out-of-cycle refresh. Returns `false` if the scheduler is gone.
    pub async fn refresh_now(&self) -> bool {
        self.command_tx
            .send(SchedulerCommand::RefreshNow)
            .await
            .is_ok()
    }

    pub async fn shutdown(&self) {
        let _ = self.command_tx.send(SchedulerCommand::Shutdown).await;
    }

    pub async fn state(&self) -> SchedulerState {
        *self.state.read().await
    }
}

/// Periodic trigger for `RefreshCoordinator::refresh`.
///
/// The first tick fires one `interval` after `run` starts; the caller is
/// expected to have done the startup refresh itself. The task stops on
/// `Shutdown` or when every handle has been dropped.
pub struct Scheduler {
    coordinator: Arc<RefreshCoordinator>,
    interval: Duration,
    state: Arc<RwLock<SchedulerState>>,
    command_rx: mpsc::Receiver<SchedulerCommand>,
}

impl Scheduler {
    pub fn new(coordinator: Arc<RefreshCoordinator>, interval: Duration) -> (Self, SchedulerHandle) {
        let (command_tx, command_rx) = mpsc::channel(8);
        let state = Arc::new(RwLock::new(SchedulerState::Idle));

        let handle = SchedulerHandle {
            command_tx,
            state: state.clone(),
        };

        let scheduler = Scheduler {
            coordinator,
            interval,
            state,
            command_rx,
        };

        (scheduler, handle)
    }

    /// Run the scheduler loop. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Scheduler running");

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh("interval").await;
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(SchedulerCommand::RefreshNow) => {
                            info!("Manual refresh requested");
                            self.refresh("manual").await;
                        }
                        Some(SchedulerCommand::Shutdown) => {
                            info!("Scheduler stopping");
                            break;
                        }
                        None => {
                            warn!("Scheduler command channel closed, stopping");
                            break;
                        }
                    }
                }
            }
        }

        *self.state.write().await = SchedulerState::Stopped;
    }

    async fn refresh(&self, trigger: &str) {
        *self.state.write().await = SchedulerState::Refreshing;
        let snapshot = self.coordinator.refresh().await;
        info!(trigger, results = snapshot.len(), "Scheduled refresh done");
        *self.state.write().await = SchedulerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use common::Candle;
    use replay::ReplaySource;
    use signals::{ScreenerConfig, SnapshotReader};

    fn uptrend(n: usize) -> Vec<Candle> {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| {
                let open = 100.0 + i as f64;
                Candle::new(start + ChronoDuration::hours(i as i64), open, open + 1.5, open - 0.5, open + 1.0)
            })
            .collect()
    }

    async fn coordinator() -> Arc<RefreshCoordinator> {
        let source = ReplaySource::new();
        source.insert("BTCUSDT", uptrend(30)).await;
        let cfg = ScreenerConfig {
            symbols: vec!["BTCUSDT".into()],
            ..ScreenerConfig::default()
        };
        Arc::new(RefreshCoordinator::new(Arc::new(source), &cfg))
    }

    async fn wait_for_snapshot(reader: &SnapshotReader) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while reader.current().await.generated_at.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("no snapshot published in time");
    }

    #[tokio::test]
    async fn refresh_now_publishes_a_snapshot() {
        let coordinator = coordinator().await;
        let reader = coordinator.reader();
        let (scheduler, handle) = Scheduler::new(coordinator, Duration::from_secs(3600));
        tokio::spawn(scheduler.run());

        assert!(handle.refresh_now().await);
        wait_for_snapshot(&reader).await;
        assert_eq!(reader.current().await.len(), 1);
    }

    #[tokio::test]
    async fn interval_tick_triggers_refresh() {
        let coordinator = coordinator().await;
        let reader = coordinator.reader();
        let (scheduler, _handle) = Scheduler::new(coordinator, Duration::from_millis(50));
        tokio::spawn(scheduler.run());

        wait_for_snapshot(&reader).await;
    }

    #[tokio::test]
    async fn no_refresh_before_first_interval() {
        let coordinator = coordinator().await;
        let reader = coordinator.reader();
        let (scheduler, _handle) = Scheduler::new(coordinator, Duration::from_secs(3600));
        tokio::spawn(scheduler.run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(reader.current().await.generated_at.is_empty());
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (scheduler, handle) = Scheduler::new(coordinator().await, Duration::from_secs(3600));
        let task = tokio::spawn(scheduler.run());

        handle.shutdown().await;
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop")
            .unwrap();

        assert_eq!(handle.state().await, SchedulerState::Stopped);
        assert!(!handle.refresh_now().await);
    }

    #[tokio::test]
    async fn dropping_all_handles_stops_the_loop() {
        let (scheduler, handle) = Scheduler::new(coordinator().await, Duration::from_secs(3600));
        let task = tokio::spawn(scheduler.run());
        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
