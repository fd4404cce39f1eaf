// src/ingest/providers/newsapi.rs
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use serde::Deserialize;

use crate::config::ENV_NEWS_API_KEY;
use crate::ingest::types::NewsProvider;
use crate::model::{parse_ts, RawArticle};

pub const DEFAULT_ENDPOINT: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: Option<Source>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// Parse an `/v2/everything` response body.
/// Articles without a usable `publishedAt` are dropped: the gate cannot place them.
pub fn parse_articles(body: &str) -> Result<Vec<RawArticle>> {
    let env: Envelope = serde_json::from_str(body).context("decoding news api response")?;
    if env.status != "ok" {
        bail!(
            "news api error: {}",
            env.message.unwrap_or_else(|| env.status.clone())
        );
    }

    let mut out = Vec::with_capacity(env.articles.len());
    for a in env.articles {
        let Some(published_at) = a.published_at.as_deref().and_then(parse_ts) else {
            tracing::warn!(
                target: "ingest",
                title = a.title.as_deref().unwrap_or_default(),
                "article without valid publishedAt, dropping"
            );
            continue;
        };
        out.push(RawArticle {
            published_at,
            title: a.title,
            description: a.description,
            source_name: a.source.and_then(|s| s.name).unwrap_or_default(),
            url: a.url,
        });
    }
    Ok(out)
}

pub struct NewsApiProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl NewsApiProvider {
    pub fn new(endpoint: Option<&str>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            http: super::http_client()?,
            endpoint: endpoint.unwrap_or(DEFAULT_ENDPOINT).to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    async fn fetch_articles(&self, query: &str) -> Result<Vec<RawArticle>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("Missing {ENV_NEWS_API_KEY} env var"))?;
        let t0 = std::time::Instant::now();

        let body = self
            .http
            .get(&self.endpoint)
            .query(&[("q", query)])
            .header("X-Api-Key", key)
            .send()
            .await
            .context("news api request")?
            .error_for_status()
            .context("news api non-2xx")?
            .text()
            .await
            .context("reading news api body")?;
        let articles = parse_articles(&body)?;

        histogram!("ingest_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("ingest_fetched_total").increment(articles.len() as u64);
        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}
