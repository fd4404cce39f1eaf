// src/sentiment/lexicon.rs
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::SentimentClassifier;
use crate::model::{Classification, SentimentLabel, SentimentScore};

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Offline classifier: word-list polarity with short-range negation.
#[derive(Debug, Clone, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (positive mass, negative mass) over the text.
    /// A negator within the previous 1..=3 tokens flips a word's polarity.
    pub fn polarity(&self, text: &str) -> (f64, f64) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut pos = 0.0;
        let mut neg = 0.0;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            let adj = if negated { -base } else { base };
            if adj > 0 {
                pos += adj as f64;
            } else {
                neg += (-adj) as f64;
            }
        }

        (pos, neg)
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        let (pos, neg) = self.polarity(text);
        let score = score_from_polarity(pos, neg);
        Classification {
            label: label_for(&score),
            score,
        }
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        Ok(self.classify_text(text))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

/// Spread polarity mass over the four labels; the result always sums to 1.
fn score_from_polarity(pos: f64, neg: f64) -> SentimentScore {
    let total = pos + neg;
    if total <= 0.0 {
        return SentimentScore {
            neutral: 1.0,
            ..Default::default()
        };
    }
    // strength saturates towards 1 as more polar words appear
    let strength = total / (total + 2.0);
    let pos_share = pos / total;
    let neg_share = neg / total;
    let mixedness = 1.0 - (pos_share - neg_share).abs();
    SentimentScore {
        positive: strength * pos_share * (1.0 - mixedness),
        negative: strength * neg_share * (1.0 - mixedness),
        neutral: 1.0 - strength,
        mixed: strength * mixedness,
    }
}

fn label_for(s: &SentimentScore) -> SentimentLabel {
    let candidates = [
        (SentimentLabel::Neutral, s.neutral),
        (SentimentLabel::Positive, s.positive),
        (SentimentLabel::Negative, s.negative),
        (SentimentLabel::Mixed, s.mixed),
    ];
    let mut best = candidates[0];
    for c in &candidates[1..] {
        if c.1 > best.1 {
            best = *c;
        }
    }
    best.0
}

/// Alphanumeric tokens, lower-case.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}
