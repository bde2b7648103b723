use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use common::{Candle, CandleSource, Error, Result};

const KLINES_PATH: &str = "/api/v3/klines";

/// Public REST client for Binance market data. No credentials required.
pub struct BinanceClient {
    base_url: String,
    http: Client,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl CandleSource for BinanceClient {
    async fn candles(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<Candle>> {
        debug!(symbol = %symbol, interval = %interval, limit, "Fetching klines from Binance");
        let body = self
            .get(
                KLINES_PATH,
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&body)
    }
}

// ─── Kline JSON parsing ──────────────────────────────────────────────────────

/// Parse the klines payload: an array of rows
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
/// Any malformed row fails the whole series.
fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            parse_row(row).map_err(|e| Error::Exchange(format!("malformed kline row {i}: {e}")))
        })
        .collect()
}

fn parse_row(row: &[Value]) -> std::result::Result<Candle, String> {
    if row.len() < 5 {
        return Err(format!("expected at least 5 fields, got {}", row.len()));
    }
    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| format!("open time is not an integer: {}", row[0]))?;
    let open_time: DateTime<Utc> = Utc
        .timestamp_millis_opt(open_time_ms)
        .single()
        .ok_or_else(|| format!("open time out of range: {open_time_ms}"))?;

    Ok(Candle {
        open_time,
        open: price(&row[1], "open")?,
        high: price(&row[2], "high")?,
        low: price(&row[3], "low")?,
        close: price(&row[4], "close")?,
    })
}

/// Binance sends prices as strings; plain numbers are accepted too.
fn price(value: &Value, field: &str) -> std::result::Result<f64, String> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    match parsed {
        Some(p) if p.is_finite() => Ok(p),
        _ => Err(format!("{field} is not a price: {value}")),
    }
}
