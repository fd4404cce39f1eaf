// src/sentiment/mod.rs
//! Sentiment classifier seam used by the enricher.

pub mod http;
pub mod lexicon;

pub use http::HttpSentimentClassifier;
pub use lexicon::LexiconClassifier;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::{ClassifierKind, Secrets, SentimentConfig};
use crate::model::Classification;

/// Request size limit of the managed classifier (UTF-8 bytes).
pub const MAX_TEXT_BYTES: usize = 5000;

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Classification>;
    fn name(&self) -> &'static str;
}

pub type DynClassifier = Arc<dyn SentimentClassifier>;

/// Build the classifier selected by config. The HTTP back-end needs an endpoint
/// and `SENTIMENT_API_KEY`.
pub fn build_classifier(cfg: &SentimentConfig, secrets: &Secrets) -> Result<DynClassifier> {
    match cfg.provider {
        ClassifierKind::Lexicon => Ok(Arc::new(LexiconClassifier::new())),
        ClassifierKind::Http => {
            let endpoint = cfg
                .endpoint
                .as_deref()
                .context("sentiment.endpoint is required for the http classifier")?;
            let key = secrets.require_sentiment()?;
            Ok(Arc::new(HttpSentimentClassifier::new(
                endpoint,
                key,
                &cfg.language_code,
            )?))
        }
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
