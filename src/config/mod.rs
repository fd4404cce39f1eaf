// src/config/mod.rs
//! Pipeline configuration (TOML) and environment-provided secrets.

pub mod pipeline;

pub use pipeline::{
    AnalysisConfig, ClassifierKind, NewsConfig, PipelineConfig, PricesConfig, ScheduleConfig,
    SentimentConfig, StorageConfig, DEFAULT_STOPWORDS,
};

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";

pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";
pub const ENV_ALPHAVANTAGE_API_KEY: &str = "ALPHAVANTAGE_API_KEY";
pub const ENV_SENTIMENT_API_KEY: &str = "SENTIMENT_API_KEY";

/// Load config from an explicit TOML file.
pub fn load_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $PIPELINE_CONFIG_PATH
/// 2) config/pipeline.toml
/// 3) built-in defaults
pub fn load_default() -> Result<PipelineConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
        }
        return load_from(&pb);
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
    if fallback.exists() {
        return load_from(&fallback);
    }
    Ok(PipelineConfig::default())
}

pub fn parse(s: &str) -> Result<PipelineConfig> {
    let cfg: PipelineConfig = toml::from_str(s)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &PipelineConfig) -> Result<()> {
    if cfg.news.query.trim().is_empty() {
        bail!("news.query must not be empty");
    }
    if cfg.analysis.window_hours <= 0 {
        bail!("analysis.window_hours must be positive");
    }
    let s = &cfg.schedule;
    if s.ingest_interval_secs == 0 || s.price_interval_secs == 0 || s.analysis_interval_secs == 0 {
        bail!("schedule intervals must be non-zero");
    }
    Ok(())
}

/// API keys, read from the environment only.
#[derive(Clone, Default)]
pub struct Secrets {
    pub news_api_key: Option<String>,
    pub alphavantage_api_key: Option<String>,
    pub sentiment_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            news_api_key: non_empty_env(ENV_NEWS_API_KEY),
            alphavantage_api_key: non_empty_env(ENV_ALPHAVANTAGE_API_KEY),
            sentiment_api_key: non_empty_env(ENV_SENTIMENT_API_KEY),
        }
    }

    pub fn require_news(&self) -> Result<&str> {
        self.news_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ENV_NEWS_API_KEY} env var"))
    }

    pub fn require_alphavantage(&self) -> Result<&str> {
        self.alphavantage_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ENV_ALPHAVANTAGE_API_KEY} env var"))
    }

    pub fn require_sentiment(&self) -> Result<&str> {
        self.sentiment_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ENV_SENTIMENT_API_KEY} env var"))
    }
}

// Key values never show up in Debug output.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("news_api_key", &self.news_api_key.is_some())
            .field("alphavantage_api_key", &self.alphavantage_api_key.is_some())
            .field("sentiment_api_key", &self.sentiment_api_key.is_some())
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
