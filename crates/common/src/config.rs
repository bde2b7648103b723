use crate::{DataMode, Error, Result};

/// Process configuration loaded from environment variables at startup.
/// Screener parameters (symbols, interval, thresholds) live in the TOML file
/// pointed to by `screener_config_path`.
#[derive(Debug, Clone)]
pub struct Config {
    // Data source
    pub data_mode: DataMode,
    pub binance_base_url: String,
    /// Recorded candles, required when `data_mode` is `Replay`.
    pub replay_path: Option<String>,

    // Dashboard
    pub dashboard_port: u16,

    // Screener config file path
    pub screener_config_path: String,
}

impl Config {
    pub const DEFAULT_BINANCE_URL: &'static str = "https://api.binance.com";

    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_mode = match var("DATA_MODE")
            .unwrap_or_else(|| "live".to_string())
            .to_lowercase()
            .as_str()
        {
            "live" => DataMode::Live,
            "replay" => DataMode::Replay,
            other => {
                return Err(Error::Config(format!(
                    "DATA_MODE must be 'live' or 'replay', got: '{other}'"
                )))
            }
        };

        let replay_path = var("REPLAY_PATH").filter(|p| !p.trim().is_empty());
        if data_mode == DataMode::Replay && replay_path.is_none() {
            return Err(Error::Config(
                "REPLAY_PATH must be set when DATA_MODE=replay".to_string(),
            ));
        }

        let dashboard_port = match var("DASHBOARD_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                Error::Config(format!("DASHBOARD_PORT is not a valid port: '{raw}'"))
            })?,
            None => 8080,
        };

        Ok(Config {
            data_mode,
            binance_base_url: var("BINANCE_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_BINANCE_URL.to_string()),
            replay_path,
            dashboard_port,
            screener_config_path: var("SCREENER_CONFIG_PATH")
                .unwrap_or_else(|| "config/screener.toml".to_string()),
        })
    }
}
