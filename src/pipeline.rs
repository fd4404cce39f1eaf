// src/pipeline.rs
//! Explicitly wired dependencies for the three jobs (news ingest, price ingest, analysis).

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::analyze::{run_daily_analysis, Aggregator};
use crate::config::{PipelineConfig, Secrets};
use crate::ingest::providers::{AlphaVantageProvider, NewsApiProvider};
use crate::ingest::types::{NewsProvider, PriceProvider};
use crate::ingest::{run_news_once, run_prices_once, IngestReport, PriceReport};
use crate::model::DailySummary;
use crate::sentiment::{build_classifier, DynClassifier};
use crate::store::{MemoryStore, PriceStore, RecordStore, SqliteStore, SummaryStore};

pub struct Pipeline {
    pub cfg: PipelineConfig,
    pub news: Arc<dyn NewsProvider>,
    pub prices: Arc<dyn PriceProvider>,
    pub classifier: DynClassifier,
    pub records: Arc<dyn RecordStore>,
    pub price_store: Arc<dyn PriceStore>,
    pub summaries: Arc<dyn SummaryStore>,
    aggregator: Aggregator,
}

impl Pipeline {
    pub fn new(
        cfg: PipelineConfig,
        news: Arc<dyn NewsProvider>,
        prices: Arc<dyn PriceProvider>,
        classifier: DynClassifier,
        records: Arc<dyn RecordStore>,
        price_store: Arc<dyn PriceStore>,
        summaries: Arc<dyn SummaryStore>,
    ) -> Self {
        let aggregator = Aggregator::from_config(&cfg.analysis);
        Self {
            cfg,
            news,
            prices,
            classifier,
            records,
            price_store,
            summaries,
            aggregator,
        }
    }

    /// Production wiring: HTTP providers, configured classifier, SQLite (or memory) store.
    pub fn from_config(cfg: PipelineConfig, secrets: &Secrets) -> Result<Self> {
        let news = Arc::new(NewsApiProvider::new(
            cfg.news.endpoint.as_deref(),
            secrets.news_api_key.clone(),
        )?);
        let prices = Arc::new(AlphaVantageProvider::new(
            cfg.prices.endpoint.as_deref(),
            secrets.alphavantage_api_key.clone(),
        )?);
        let classifier = build_classifier(&cfg.sentiment, secrets)?;

        let pipeline = match cfg.storage.database_path.clone() {
            Some(path) => {
                let store = Arc::new(SqliteStore::open(&path)?);
                info!(path = %path, "using sqlite store");
                Self::new(cfg, news, prices, classifier, store.clone(), store.clone(), store)
            }
            None => {
                let store = Arc::new(MemoryStore::new());
                info!("no storage.database_path configured, using in-memory store");
                Self::new(cfg, news, prices, classifier, store.clone(), store.clone(), store)
            }
        };
        Ok(pipeline)
    }

    pub async fn ingest_news(&self) -> Result<IngestReport> {
        run_news_once(
            self.news.as_ref(),
            self.classifier.as_ref(),
            self.records.as_ref(),
            &self.cfg.news.query,
            self.cfg.news.asset(),
        )
        .await
    }

    pub async fn ingest_prices(&self) -> PriceReport {
        run_prices_once(
            self.prices.as_ref(),
            self.price_store.as_ref(),
            &self.cfg.prices.symbols,
        )
        .await
    }

    /// Like [`Pipeline::ingest_prices`] but any failed symbol makes the run an error.
    pub async fn ingest_prices_strict(&self) -> Result<PriceReport> {
        let report = self.ingest_prices().await;
        if !report.failed.is_empty() {
            bail!("price ingest failed for: {}", report.failed.join(", "));
        }
        Ok(report)
    }

    /// Runs [`Pipeline::analyze`] on tokio's blocking pool; the stores do synchronous I/O.
    pub async fn analyze_offloaded(self: Arc<Self>, now: DateTime<Utc>) -> Result<DailySummary> {
        tokio::task::spawn_blocking(move || self.analyze(now))
            .await
            .context("analysis task did not complete")?
    }

    /// Every stored summary, read on the blocking pool.
    pub async fn summaries_offloaded(&self) -> Result<Vec<DailySummary>> {
        let store = Arc::clone(&self.summaries);
        tokio::task::spawn_blocking(move || store.scan())
            .await
            .context("summary scan did not complete")?
    }

    pub fn analyze(&self, now: DateTime<Utc>) -> Result<DailySummary> {
        run_daily_analysis(
            self.records.as_ref(),
            self.summaries.as_ref(),
            &self.aggregator,
            self.cfg.news.asset(),
            now,
            Duration::hours(self.cfg.analysis.window_hours),
        )
    }
}
