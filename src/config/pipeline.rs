// src/config/pipeline.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_STOPWORDS: &[&str] = &["the", "and", "of", "to", "a", "is", "in", "for", "on"];

fn default_language_code() -> String {
    "en".to_string()
}
fn default_window_hours() -> i64 {
    24
}
fn default_top_n() -> usize {
    10
}
fn default_stopwords() -> Vec<String> {
    DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub news: NewsConfig,
    pub prices: PricesConfig,
    pub sentiment: SentimentConfig,
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// Keyword sent to the news API.
    pub query: String,
    /// Tracked entity the records are filed under; defaults to `query`.
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            query: "Tesla".to_string(),
            asset: None,
            endpoint: None,
        }
    }
}

impl NewsConfig {
    pub fn asset(&self) -> &str {
        self.asset
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(&self.query)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricesConfig {
    pub symbols: Vec<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string()],
            endpoint: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Offline word-list scorer.
    #[default]
    Lexicon,
    /// Managed classifier reached over HTTP.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default)]
    pub provider: ClassifierKind,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierKind::default(),
            endpoint: None,
            language_code: default_language_code(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            top_n: default_top_n(),
            stopwords: default_stopwords(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file; in-memory stores are used when absent.
    #[serde(default)]
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    pub ingest_interval_secs: u64,
    pub price_interval_secs: u64,
    pub analysis_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ingest_interval_secs: 3600,
            price_interval_secs: 24 * 3600,
            analysis_interval_secs: 24 * 3600,
        }
    }
}
