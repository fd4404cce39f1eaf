// src/model.rs
//! Core records that flow through the ingestion and analytics paths.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Article as returned by a news provider. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub published_at: DateTime<Utc>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub source_name: String,
    pub url: Option<String>,
}

/// Label set of the managed classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Mixed => "MIXED",
        }
    }

    /// Case-insensitive parse of the classifier's label string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" => Some(SentimentLabel::Positive),
            "NEGATIVE" => Some(SentimentLabel::Negative),
            "NEUTRAL" => Some(SentimentLabel::Neutral),
            "MIXED" => Some(SentimentLabel::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentScore {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub mixed: f64,
}

/// Output of one classifier call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: SentimentLabel,
    pub score: SentimentScore,
}

/// A fetched article plus its classification. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub asset: String,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub sentiment: SentimentLabel,
    pub sentiment_score: SentimentScore,
    pub source: String,
}

impl EnrichedRecord {
    /// `YYYY-MM-DD` of the record's timestamp (UTC).
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// One row of a daily price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Close price with its day-over-day return, stored per symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub symbol: String,
    pub date: NaiveDate,
    pub close_price: f64,
    pub daily_return: f64,
}

/// Per-label counters. Serialized with the classifier's uppercase label names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelCounts {
    #[serde(rename = "POSITIVE")]
    pub positive: u64,
    #[serde(rename = "NEGATIVE")]
    pub negative: u64,
    #[serde(rename = "NEUTRAL")]
    pub neutral: u64,
    #[serde(rename = "MIXED")]
    pub mixed: u64,
}

impl LabelCounts {
    pub fn bump(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Negative => self.negative += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Mixed => self.mixed += 1,
        }
    }

    pub fn get(&self, label: SentimentLabel) -> u64 {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Mixed => self.mixed,
        }
    }

    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral + self.mixed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub mixed: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub volume: u64,
    /// Mean classifier confidence for POSITIVE over the day's records.
    pub average_positive_score: f64,
    /// Share of the day's records labelled POSITIVE.
    pub positive_ratio: f64,
}

/// Aggregate over one window of enriched records, stored under `(date, asset)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub asset: String,
    pub record_count: u64,
    pub sentiment_distribution: LabelCounts,
    pub sentiment_trends: Vec<TrendPoint>,
    pub top_sources: Vec<TermCount>,
    pub top_keywords: Vec<TermCount>,
    pub sentiment_vs_volume: Vec<VolumePoint>,
    pub updated_at: DateTime<Utc>,
}

/// Result of a keyed insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// Canonical timestamp text used in storage: `2024-05-01T13:45:00Z`.
/// Fixed width so lexicographic order matches time order.
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Record timestamps are whole seconds, the resolution of [`format_ts`].
pub fn to_record_ts(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(0)
}

/// Parse RFC 3339 text into a UTC record timestamp; fractions are dropped.
pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| to_record_ts(dt.with_timezone(&Utc)))
}
