// src/sentiment/http.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{truncate_utf8, SentimentClassifier, MAX_TEXT_BYTES};
use crate::model::{Classification, SentimentLabel, SentimentScore};

/// Managed sentiment classifier reached over HTTP.
///
/// Speaks the `DetectSentiment` JSON shape: `{Text, LanguageCode}` in,
/// `{Sentiment, SentimentScore}` out.
pub struct HttpSentimentClassifier {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    language_code: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DetectRequest<'a> {
    text: &'a str,
    language_code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectResponse {
    sentiment: String,
    sentiment_score: WireScore,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireScore {
    #[serde(default)]
    positive: f64,
    #[serde(default)]
    negative: f64,
    #[serde(default)]
    neutral: f64,
    #[serde(default)]
    mixed: f64,
}

impl HttpSentimentClassifier {
    pub fn new(endpoint: &str, api_key: &str, language_code: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stock-news-sentiment/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .context("building sentiment http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            language_code: language_code.to_string(),
        })
    }
}

/// Decode a classifier response body.
pub fn parse_response(body: &str) -> Result<Classification> {
    let resp: DetectResponse =
        serde_json::from_str(body).context("decoding sentiment response")?;
    let label = SentimentLabel::parse(&resp.sentiment)
        .ok_or_else(|| anyhow!("unknown sentiment label {:?}", resp.sentiment))?;
    let s = resp.sentiment_score;
    Ok(Classification {
        label,
        score: SentimentScore {
            positive: s.positive,
            negative: s.negative,
            neutral: s.neutral,
            mixed: s.mixed,
        },
    })
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        let req = DetectRequest {
            text: truncate_utf8(text, MAX_TEXT_BYTES),
            language_code: &self.language_code,
        };
        let body = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("sentiment request")?
            .error_for_status()
            .context("sentiment non-2xx")?
            .text()
            .await
            .context("reading sentiment response")?;
        parse_response(&body)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_detect_sentiment_shape() {
        let body = r#"{
            "Sentiment": "NEGATIVE",
            "SentimentScore": {"Positive": 0.01, "Negative": 0.93, "Neutral": 0.05, "Mixed": 0.01}
        }"#;
        let c = parse_response(body).unwrap();
        assert_eq!(c.label, SentimentLabel::Negative);
        assert_eq!(c.score.negative, 0.93);
        assert_eq!(c.score.mixed, 0.01);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let body = r#"{"Sentiment": "ECSTATIC", "SentimentScore": {}}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("ECSTATIC"));
    }

    #[test]
    fn request_uses_pascal_case_fields() {
        let req = DetectRequest {
            text: "hi",
            language_code: "en",
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["Text"], "hi");
        assert_eq!(v["LanguageCode"], "en");
    }
}
