// src/analyze/summary.rs
//! Pure aggregation of enriched records into a [`DailySummary`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use super::keywords::{keywords, top_terms};
use crate::config::AnalysisConfig;
use crate::model::{DailySummary, EnrichedRecord, LabelCounts, TrendPoint, VolumePoint};

#[derive(Debug, Clone)]
pub struct Aggregator {
    top_n: usize,
    stopwords: HashSet<String>,
}

#[derive(Default)]
struct DayBucket {
    counts: LabelCounts,
    positive_score_sum: f64,
}

impl Aggregator {
    pub fn new<I, S>(top_n: usize, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            top_n,
            stopwords: stopwords
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn from_config(cfg: &AnalysisConfig) -> Self {
        Self::new(cfg.top_n, &cfg.stopwords)
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Summarize `records` (already restricted to the window) for `asset`.
    /// The summary is dated `now`'s UTC day; the same inputs always give the same output.
    pub fn summarize(
        &self,
        records: &[EnrichedRecord],
        asset: &str,
        now: DateTime<Utc>,
    ) -> DailySummary {
        let mut distribution = LabelCounts::default();
        let mut days: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
        let mut sources: HashMap<String, u64> = HashMap::new();
        let mut words: HashMap<String, u64> = HashMap::new();

        // fixed visiting order keeps the float sums independent of input order
        let mut ordered: Vec<&EnrichedRecord> = records.iter().collect();
        ordered.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.title.cmp(&b.title))
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| {
                    a.sentiment_score
                        .positive
                        .total_cmp(&b.sentiment_score.positive)
                })
        });

        for r in ordered {
            distribution.bump(r.sentiment);

            let day = days.entry(r.day()).or_default();
            day.counts.bump(r.sentiment);
            day.positive_score_sum += r.sentiment_score.positive;

            *sources.entry(r.source.clone()).or_default() += 1;

            let text = format!("{} {}", r.title, r.description);
            for w in keywords(&text, &self.stopwords) {
                *words.entry(w).or_default() += 1;
            }
        }

        let sentiment_trends = days
            .iter()
            .map(|(date, b)| TrendPoint {
                date: *date,
                positive: b.counts.positive,
                negative: b.counts.negative,
                neutral: b.counts.neutral,
                mixed: b.counts.mixed,
                total: b.counts.total(),
            })
            .collect();

        let sentiment_vs_volume = days
            .iter()
            .map(|(date, b)| {
                let volume = b.counts.total();
                let (avg, ratio) = if volume > 0 {
                    (
                        b.positive_score_sum / volume as f64,
                        b.counts.positive as f64 / volume as f64,
                    )
                } else {
                    (0.0, 0.0)
                };
                VolumePoint {
                    date: *date,
                    volume,
                    average_positive_score: avg,
                    positive_ratio: ratio,
                }
            })
            .collect();

        DailySummary {
            date: now.date_naive(),
            asset: asset.to_string(),
            record_count: records.len() as u64,
            sentiment_distribution: distribution,
            sentiment_trends,
            top_sources: top_terms(sources, self.top_n),
            top_keywords: top_terms(words, self.top_n),
            sentiment_vs_volume,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SentimentLabel, SentimentScore};
    use chrono::TimeZone;

    fn rec(
        day: u32,
        label: SentimentLabel,
        positive: f64,
        source: &str,
        title: &str,
    ) -> EnrichedRecord {
        EnrichedRecord {
            asset: "Tesla".into(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
            title: title.into(),
            description: "cybertruck deliveries".into(),
            sentiment: label,
            sentiment_score: SentimentScore {
                positive,
                ..Default::default()
            },
            source: source.into(),
        }
    }

    #[test]
    fn groups_by_day_and_averages_positive_score() {
        let agg = Aggregator::new(10, ["the"]);
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let records = vec![
            rec(1, SentimentLabel::Positive, 0.9, "Reuters", "The rally"),
            rec(1, SentimentLabel::Negative, 0.1, "Reuters", "The slump"),
            rec(2, SentimentLabel::Neutral, 0.2, "Bloomberg", "Quiet day"),
        ];
        let s = agg.summarize(&records, "Tesla", now);

        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(s.record_count, 3);
        assert_eq!(s.sentiment_distribution.positive, 1);
        assert_eq!(s.sentiment_distribution.negative, 1);
        assert_eq!(s.sentiment_distribution.neutral, 1);

        assert_eq!(s.sentiment_trends.len(), 2);
        assert_eq!(s.sentiment_trends[0].total, 2);
        assert_eq!(s.sentiment_trends[1].neutral, 1);

        let d1 = &s.sentiment_vs_volume[0];
        assert_eq!(d1.volume, 2);
        assert!((d1.average_positive_score - 0.5).abs() < 1e-12);
        assert!((d1.positive_ratio - 0.5).abs() < 1e-12);

        assert_eq!(s.top_sources[0].term, "Reuters");
        assert_eq!(s.top_sources[0].count, 2);

        // "cybertruck" and "deliveries" appear in every record
        assert_eq!(s.top_keywords[0].count, 3);
        assert!(s.top_keywords.iter().all(|t| t.term != "the"));
    }

    #[test]
    fn top_n_caps_tables() {
        let agg = Aggregator::new(1, Vec::<String>::new());
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap();
        let records = vec![
            rec(1, SentimentLabel::Positive, 0.9, "A", "x"),
            rec(1, SentimentLabel::Positive, 0.9, "B", "y"),
        ];
        let s = agg.summarize(&records, "Tesla", now);
        assert_eq!(s.top_sources.len(), 1);
        assert_eq!(s.top_keywords.len(), 1);
    }

    #[test]
    fn stopwords_are_normalized() {
        let agg = Aggregator::new(5, [" The ", "", "AND"]);
        assert!(agg.stopwords().contains("the"));
        assert!(agg.stopwords().contains("and"));
        assert_eq!(agg.stopwords().len(), 2);
    }
}
