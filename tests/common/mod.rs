// tests/common/mod.rs
// Shared fakes: fixture-backed providers and a pipeline over an in-memory store.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use stock_news_sentiment::config::PipelineConfig;
use stock_news_sentiment::ingest::providers::{alphavantage, newsapi};
use stock_news_sentiment::ingest::types::{NewsProvider, PriceProvider};
use stock_news_sentiment::model::{
    Classification, DailyBar, EnrichedRecord, RawArticle, SentimentLabel, SentimentScore,
};
use stock_news_sentiment::sentiment::{LexiconClassifier, SentimentClassifier};
use stock_news_sentiment::store::MemoryStore;
use stock_news_sentiment::Pipeline;

pub const NEWS_FIXTURE: &str = include_str!("../fixtures/newsapi_everything.json");
pub const PRICES_FIXTURE: &str = include_str!("../fixtures/alphavantage_daily.json");

/// News provider whose response can be swapped between runs.
pub struct FixtureNews {
    pub articles: Mutex<Vec<RawArticle>>,
    pub fail: bool,
}

impl FixtureNews {
    pub fn from_body(body: &str) -> Self {
        Self::new(newsapi::parse_articles(body).expect("news fixture"))
    }

    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self {
            articles: Mutex::new(articles),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: Mutex::new(vec![]),
            fail: true,
        }
    }

    pub fn set(&self, articles: Vec<RawArticle>) {
        *self.articles.lock().unwrap() = articles;
    }
}

#[async_trait]
impl NewsProvider for FixtureNews {
    async fn fetch_articles(&self, _query: &str) -> Result<Vec<RawArticle>> {
        if self.fail {
            bail!("upstream unavailable");
        }
        Ok(self.articles.lock().unwrap().clone())
    }
    fn name(&self) -> &'static str {
        "fixture-news"
    }
}

/// Same series for every symbol except `bad_symbol`, which errors.
pub struct FixturePrices {
    pub bars: Vec<DailyBar>,
    pub bad_symbol: Option<String>,
}

impl FixturePrices {
    pub fn from_body(body: &str) -> Self {
        Self {
            bars: alphavantage::parse_daily(body).expect("price fixture"),
            bad_symbol: None,
        }
    }
}

#[async_trait]
impl PriceProvider for FixturePrices {
    async fn fetch_daily(&self, symbol: &str) -> Result<Vec<DailyBar>> {
        if self.bad_symbol.as_deref() == Some(symbol) {
            bail!("Invalid API call for {symbol}");
        }
        Ok(self.bars.clone())
    }
    fn name(&self) -> &'static str {
        "fixture-prices"
    }
}

/// Classifier that always errors, for failure-path tests.
pub struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> Result<Classification> {
        bail!("classifier throttled")
    }
    fn name(&self) -> &'static str {
        "failing"
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub news: Arc<FixtureNews>,
    pub pipeline: Arc<Pipeline>,
}

pub fn harness_with(
    cfg: PipelineConfig,
    news: FixtureNews,
    prices: FixturePrices,
    classifier: Arc<dyn SentimentClassifier>,
) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let news = Arc::new(news);
    let pipeline = Arc::new(Pipeline::new(
        cfg,
        news.clone(),
        Arc::new(prices),
        classifier,
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    Harness {
        store,
        news,
        pipeline,
    }
}

pub fn harness() -> Harness {
    harness_with(
        PipelineConfig::default(),
        FixtureNews::from_body(NEWS_FIXTURE),
        FixturePrices::from_body(PRICES_FIXTURE),
        Arc::new(LexiconClassifier::new()),
    )
}

pub fn ts(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, d, h, m, 0).unwrap()
}

pub fn article(published_at: DateTime<Utc>, title: &str, description: Option<&str>) -> RawArticle {
    RawArticle {
        published_at,
        title: Some(title.to_string()),
        description: description.map(str::to_string),
        source_name: "Reuters".to_string(),
        url: None,
    }
}

pub fn record(
    asset: &str,
    timestamp: DateTime<Utc>,
    label: SentimentLabel,
    source: &str,
) -> EnrichedRecord {
    EnrichedRecord {
        asset: asset.to_string(),
        timestamp,
        title: "Tesla update".to_string(),
        description: "deliveries and margins".to_string(),
        sentiment: label,
        sentiment_score: SentimentScore {
            positive: if label == SentimentLabel::Positive { 0.9 } else { 0.1 },
            ..Default::default()
        },
        source: source.to_string(),
    }
}
