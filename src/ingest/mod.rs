// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;
pub mod watermark;

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::analyze::daily_returns;
use crate::ingest::types::{NewsProvider, PriceProvider};
use crate::ingest::watermark::{news_watermark, price_watermark};
use crate::model::{EnrichedRecord, InsertOutcome, RawArticle};
use crate::sentiment::SentimentClassifier;
use crate::store::{PriceStore, RecordStore};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_fetched_total", "Articles returned by the news provider.");
        describe_counter!("ingest_inserted_total", "Enriched records written.");
        describe_counter!(
            "ingest_skipped_seen_total",
            "Articles at or below the asset watermark."
        );
        describe_counter!(
            "ingest_skipped_missing_text_total",
            "Articles without a usable description."
        );
        describe_counter!(
            "ingest_duplicates_total",
            "Inserts rejected by the (asset, timestamp) key."
        );
        describe_counter!("prices_inserted_total", "Daily return rows written.");
        describe_counter!("prices_symbol_errors_total", "Symbols whose fetch failed.");
        describe_histogram!("ingest_fetch_ms", "News provider round-trip in milliseconds.");
        describe_gauge!(
            "ingest_pipeline_last_run_ts",
            "Unix ts when the news ingest last finished."
        );
    });
}

/// Normalize text: decode entities, strip tags, straighten quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Classify one article. `Ok(None)` means the article has no usable description
/// and is skipped without failing the batch.
pub async fn enrich(
    article: &RawArticle,
    asset: &str,
    classifier: &dyn SentimentClassifier,
) -> Result<Option<EnrichedRecord>> {
    let description = article
        .description
        .as_deref()
        .map(normalize_text)
        .unwrap_or_default();
    if description.is_empty() {
        return Ok(None);
    }
    let title = article
        .title
        .as_deref()
        .map(normalize_text)
        .unwrap_or_default();

    let c = classifier
        .classify(&description)
        .await
        .with_context(|| format!("classifying article {title:?} via {}", classifier.name()))?;

    Ok(Some(EnrichedRecord {
        asset: asset.to_string(),
        timestamp: article.published_at,
        title,
        description,
        sentiment: c.label,
        sentiment_score: c.score,
        source: article.source_name.clone(),
    }))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub fetched: usize,
    pub inserted: usize,
    pub skipped_seen: usize,
    pub skipped_missing_text: usize,
    pub duplicates: usize,
}

/// Fetch → gate → enrich → persist for one tracked asset.
///
/// Any provider, classifier or store failure aborts the run; records inserted
/// before the failure stay persisted.
pub async fn run_news_once(
    provider: &dyn NewsProvider,
    classifier: &dyn SentimentClassifier,
    store: &dyn RecordStore,
    query: &str,
    asset: &str,
) -> Result<IngestReport> {
    ensure_metrics_described();

    let articles = provider
        .fetch_articles(query)
        .await
        .with_context(|| format!("fetching news for {query:?} from {}", provider.name()))?;
    let watermark = news_watermark(store, asset)?;

    let mut report = IngestReport {
        fetched: articles.len(),
        ..Default::default()
    };

    for article in &articles {
        let title = article.title.as_deref().unwrap_or_default();
        if !watermark.is_new(article.published_at) {
            report.skipped_seen += 1;
            tracing::debug!(target: "ingest", title, "article already stored, skipping");
            continue;
        }

        let Some(record) = enrich(article, asset, classifier).await? else {
            report.skipped_missing_text += 1;
            tracing::info!(
                target: "ingest",
                title,
                "skipping article with missing or empty description"
            );
            continue;
        };

        match store.insert_record(&record)? {
            InsertOutcome::Inserted => {
                report.inserted += 1;
                tracing::debug!(
                    target: "ingest",
                    title,
                    label = record.sentiment.as_str(),
                    "inserted"
                );
            }
            InsertOutcome::Duplicate => {
                report.duplicates += 1;
                tracing::warn!(
                    target: "ingest",
                    title,
                    ts = %record.timestamp,
                    "record with same asset and timestamp already stored"
                );
            }
        }
    }

    counter!("ingest_inserted_total").increment(report.inserted as u64);
    counter!("ingest_skipped_seen_total").increment(report.skipped_seen as u64);
    counter!("ingest_skipped_missing_text_total").increment(report.skipped_missing_text as u64);
    counter!("ingest_duplicates_total").increment(report.duplicates as u64);
    gauge!("ingest_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        target: "ingest",
        asset,
        fetched = report.fetched,
        inserted = report.inserted,
        seen = report.skipped_seen,
        missing_text = report.skipped_missing_text,
        duplicates = report.duplicates,
        "news ingest finished"
    );
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PriceReport {
    pub symbols: usize,
    pub inserted: usize,
    pub failed: Vec<String>,
}

/// Fetch daily series, compute returns and store the rows newer than each
/// symbol's watermark. A failing symbol is logged and does not stop the others.
pub async fn run_prices_once(
    provider: &dyn PriceProvider,
    store: &dyn PriceStore,
    symbols: &[String],
) -> PriceReport {
    ensure_metrics_described();

    let mut report = PriceReport {
        symbols: symbols.len(),
        ..Default::default()
    };

    for symbol in symbols {
        match ingest_symbol(provider, store, symbol).await {
            Ok(n) => {
                report.inserted += n;
                tracing::info!(
                    target: "ingest",
                    symbol = symbol.as_str(),
                    inserted = n,
                    "stored daily returns"
                );
            }
            Err(e) => {
                tracing::warn!(
                    target: "ingest",
                    symbol = symbol.as_str(),
                    error = ?e,
                    "price ingest failed"
                );
                counter!("prices_symbol_errors_total").increment(1);
                report.failed.push(symbol.clone());
            }
        }
    }

    counter!("prices_inserted_total").increment(report.inserted as u64);
    report
}

async fn ingest_symbol(
    provider: &dyn PriceProvider,
    store: &dyn PriceStore,
    symbol: &str,
) -> Result<usize> {
    let bars = provider
        .fetch_daily(symbol)
        .await
        .with_context(|| format!("fetching daily series for {symbol} from {}", provider.name()))?;
    // Returns are computed over the full series so the first new row still
    // sees its previous close.
    let rows = daily_returns(symbol, &bars);
    let watermark = price_watermark(store, symbol)?;
    let fresh: Vec<_> = rows.into_iter().filter(|r| watermark.is_new(r.date)).collect();
    if fresh.is_empty() {
        return Ok(0);
    }
    store.insert_returns(&fresh)
}
