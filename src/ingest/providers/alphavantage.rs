// src/ingest/providers/alphavantage.rs
use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ENV_ALPHAVANTAGE_API_KEY;
use crate::ingest::types::PriceProvider;
use crate::model::DailyBar;

pub const DEFAULT_ENDPOINT: &str = "https://www.alphavantage.co/query";
const SERIES_KEY: &str = "Time Series (Daily)";

#[derive(Debug, Deserialize)]
struct Bar {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

fn num<T: std::str::FromStr>(field: &str, raw: &str, date: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| anyhow!("bad {field} {raw:?} on {date}"))
}

/// Parse a `TIME_SERIES_DAILY` body into bars sorted by date ascending.
pub fn parse_daily(body: &str) -> Result<Vec<DailyBar>> {
    let mut v: Value = serde_json::from_str(body).context("decoding price api response")?;

    let Some(series) = v.get_mut(SERIES_KEY).map(Value::take) else {
        // Throttling and bad-symbol replies come back as 200 with one of these keys.
        for key in ["Error Message", "Note", "Information"] {
            if let Some(msg) = v.get(key).and_then(Value::as_str) {
                bail!("price api: {msg}");
            }
        }
        bail!("price api response has no {SERIES_KEY:?}");
    };

    let raw: BTreeMap<String, Bar> =
        serde_json::from_value(series).context("decoding daily series")?;
    let mut out = Vec::with_capacity(raw.len());
    for (date, bar) in raw {
        out.push(DailyBar {
            date: NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("bad series date {date:?}"))?,
            open: num("open", &bar.open, &date)?,
            high: num("high", &bar.high, &date)?,
            low: num("low", &bar.low, &date)?,
            close: num("close", &bar.close, &date)?,
            volume: num("volume", &bar.volume, &date)?,
        });
    }
    out.sort_by_key(|b| b.date);
    Ok(out)
}

pub struct AlphaVantageProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl AlphaVantageProvider {
    pub fn new(endpoint: Option<&str>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            http: super::http_client()?,
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl PriceProvider for AlphaVantageProvider {
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<DailyBar>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ENV_ALPHAVANTAGE_API_KEY} env var"))?;

        let body = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", symbol),
                ("apikey", key),
            ])
            .send()
            .await
            .with_context(|| format!("price api request for {symbol}"))?
            .error_for_status()
            .context("price api non-2xx")?
            .text()
            .await
            .context("reading price api body")?;
        parse_daily(&body).with_context(|| format!("parsing daily series for {symbol}"))
    }

    fn name(&self) -> &'static str {
        "alphavantage"
    }
}
