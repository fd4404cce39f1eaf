pub mod alphavantage;
pub mod newsapi;

pub use alphavantage::AlphaVantageProvider;
pub use newsapi::NewsApiProvider;

use std::time::Duration;

use anyhow::{Context, Result};

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("stock-news-sentiment/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(15))
        .build()
        .context("building provider http client")
}
