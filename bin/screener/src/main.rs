use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{CandleSource, Config, DataMode};
use engine::{BinanceClient, Scheduler};
use replay::ReplaySource;
use signals::{RefreshCoordinator, ScreenerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("invalid environment configuration")?;
    let screener = ScreenerConfig::load(&cfg.screener_config_path)
        .context("invalid screener configuration")?;
    info!(
        mode = %cfg.data_mode,
        symbols = ?screener.symbols,
        interval = %screener.interval,
        refresh_secs = screener.refresh_interval_secs,
        "Screener starting"
    );

    // ── Candle source (injected based on DATA_MODE) ───────────────────────────
    let source: Arc<dyn CandleSource> = match cfg.data_mode {
        DataMode::Live => {
            info!(base_url = %cfg.binance_base_url, "Live mode, using BinanceClient");
            Arc::new(BinanceClient::new(&cfg.binance_base_url)?)
        }
        DataMode::Replay => {
            let path = cfg
                .replay_path
                .as_deref()
                .context("REPLAY_PATH must be set when DATA_MODE=replay")?;
            info!(path, "Replay mode, using ReplaySource");
            let replay = ReplaySource::from_json_file(path)?;
            let recorded = replay.symbols().await;
            for symbol in screener.symbols.iter().filter(|s| !recorded.contains(s)) {
                warn!(symbol = %symbol, path, "Configured symbol has no recorded candles");
            }
            Arc::new(replay)
        }
    };

    // ── Coordinator + first snapshot ──────────────────────────────────────────
    let coordinator = Arc::new(RefreshCoordinator::new(source, &screener));
    let first = coordinator.refresh().await;
    info!(results = first.len(), "Initial snapshot published");

    // ── Scheduler ─────────────────────────────────────────────────────────────
    let (scheduler, scheduler_handle) =
        Scheduler::new(coordinator.clone(), screener.refresh_interval());
    let scheduler_task = tokio::spawn(scheduler.run());

    // ── Dashboard ─────────────────────────────────────────────────────────────
    let api_state = api::AppState {
        snapshots: coordinator.reader(),
        scheduler: scheduler_handle.clone(),
        data_mode: cfg.data_mode,
    };
    let port = cfg.dashboard_port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Dashboard server stopped");
        }
    });

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received. Stopping scheduler.");

    scheduler_handle.shutdown().await;
    scheduler_task.await.context("scheduler task panicked")?;
    info!("Exiting.");
    Ok(())
}
