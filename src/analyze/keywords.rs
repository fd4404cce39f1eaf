// src/analyze/keywords.rs
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::TermCount;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w+\b").expect("word regex"));

/// Lower-cased words of `text` that are not stopwords.
pub fn keywords<'a>(
    text: &'a str,
    stopwords: &'a HashSet<String>,
) -> impl Iterator<Item = String> + 'a {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(move |w| !stopwords.contains(w))
}

/// Highest counts first; equal counts ordered by term so output is stable.
pub fn top_terms(counts: HashMap<String, u64>, n: usize) -> Vec<TermCount> {
    let mut v: Vec<TermCount> = counts
        .into_iter()
        .map(|(term, count)| TermCount { term, count })
        .collect();
    v.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
    v.truncate(n);
    v
}
