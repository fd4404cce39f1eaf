// src/ingest/types.rs
use anyhow::Result;

use crate::model::{DailyBar, RawArticle};

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Articles matching `query`, in whatever order the upstream returns them.
    async fn fetch_articles(&self, query: &str) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}

#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily bars for `symbol`, oldest first.
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<DailyBar>>;
    fn name(&self) -> &'static str;
}
