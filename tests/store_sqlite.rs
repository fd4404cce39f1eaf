// tests/store_sqlite.rs
// File-backed store: watermarks and summaries survive a reopen.
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use common::{article, record, ts, FixtureNews, FixturePrices, PRICES_FIXTURE};
use stock_news_sentiment::analyze::Aggregator;
use stock_news_sentiment::config::PipelineConfig;
use stock_news_sentiment::ingest::providers::newsapi::parse_articles;
use stock_news_sentiment::ingest::watermark::news_watermark;
use stock_news_sentiment::ingest::{run_news_once, IngestReport};
use stock_news_sentiment::model::{Classification, InsertOutcome};
use stock_news_sentiment::sentiment::{LexiconClassifier, SentimentClassifier};
use stock_news_sentiment::store::{MemoryStore, RecordStore, SqliteStore, SummaryStore};
use stock_news_sentiment::{Pipeline, SentimentLabel};

#[test]
fn watermark_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("market.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        for (h, label) in [(8, SentimentLabel::Positive), (11, SentimentLabel::Negative)] {
            store
                .insert_record(&record("Tesla", ts(1, h, 0), label, "Reuters"))
                .unwrap();
        }
    }

    let store = SqliteStore::open(&path).unwrap();
    let wm = news_watermark(&store, "Tesla").unwrap();
    assert_eq!(wm.mark(), Some(ts(1, 11, 0)));
    assert!(!wm.is_new(ts(1, 11, 0)));
    assert!(wm.is_new(ts(1, 11, 1)));

    let again = store
        .insert_record(&record("Tesla", ts(1, 8, 0), SentimentLabel::Neutral, "CNBC"))
        .unwrap();
    assert_eq!(again, InsertOutcome::Duplicate);
}

#[tokio::test]
async fn ingest_run_against_sqlite_is_incremental() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.db");
    let classifier = LexiconClassifier::new();
    let news = FixtureNews::new(vec![
        article(
            ts(2, 9, 0),
            "Tesla shares surge",
            Some("Tesla shares surge on record deliveries."),
        ),
        article(ts(2, 10, 0), "Tesla recall", Some("Tesla stock drops after a recall.")),
    ]);

    let store = SqliteStore::open(&path).unwrap();
    let r1 = run_news_once(&news, &classifier, &store, "Tesla", "Tesla").await.unwrap();
    assert_eq!(r1.inserted, 2);
    drop(store);

    news.set(vec![
        article(ts(2, 10, 0), "Tesla recall", Some("Tesla stock drops after a recall.")),
        article(ts(2, 12, 0), "Tesla update", Some("Tesla holds its guidance.")),
    ]);
    let store = SqliteStore::open(&path).unwrap();
    let r2 = run_news_once(&news, &classifier, &store, "Tesla", "Tesla").await.unwrap();
    assert_eq!(r2.inserted, 1);
    assert_eq!(r2.skipped_seen, 1);

    let all = store.records_between("Tesla", ts(1, 0, 0), ts(3, 0, 0)).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].sentiment, SentimentLabel::Positive);
    assert_eq!(all[1].sentiment, SentimentLabel::Negative);
}

#[test]
fn summary_put_overwrites_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.db");
    let agg = Aggregator::new(10, ["the"]);

    let recs = vec![record("Tesla", ts(2, 9, 0), SentimentLabel::Positive, "Reuters")];
    {
        let store = SqliteStore::open(&path).unwrap();
        store.put_summary(&agg.summarize(&[], "Tesla", ts(2, 20, 0))).unwrap();
        store.put_summary(&agg.summarize(&recs, "Tesla", ts(2, 21, 0))).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let items = store.scan().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record_count, 1);
    assert_eq!(items[0].updated_at, ts(2, 21, 0));
    assert_eq!(items[0], agg.summarize(&recs, "Tesla", ts(2, 21, 0)));
}

#[tokio::test]
async fn pipeline_over_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("market.db");
    let store = Arc::new(SqliteStore::open(&path).unwrap());

    let p = Arc::new(Pipeline::new(
        PipelineConfig::default(),
        Arc::new(FixtureNews::new(vec![article(
            ts(2, 9, 0),
            "Tesla update",
            Some("Tesla shares surge."),
        )])),
        Arc::new(FixturePrices::from_body(PRICES_FIXTURE)),
        Arc::new(LexiconClassifier::new()),
        store.clone(),
        store.clone(),
        store.clone(),
    ));

    assert_eq!(p.ingest_news().await.unwrap().inserted, 1);
    assert_eq!(p.ingest_prices().await.inserted, 3);
    let s = p.clone().analyze_offloaded(ts(2, 20, 0)).await.unwrap();
    assert_eq!(s.record_count, 1);
    assert_eq!(store.scan().unwrap().len(), 1);
    assert_eq!(p.summaries_offloaded().await.unwrap(), vec![s]);
}

/// Lexicon classifier that counts how often it is asked.
#[derive(Default)]
struct CountingClassifier {
    calls: AtomicUsize,
}

#[async_trait]
impl SentimentClassifier for CountingClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        LexiconClassifier::new().classify(text).await
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

const SUBSECOND_FEED: &str = r#"{
  "status": "ok",
  "articles": [
    {
      "source": {"name": "Reuters"},
      "title": "Tesla shares surge",
      "description": "Tesla shares surge on record deliveries.",
      "publishedAt": "2024-07-02T09:00:00.700Z"
    },
    {
      "source": {"name": "Bloomberg"},
      "title": "Tesla recall",
      "description": "Tesla stock drops after a recall.",
      "publishedAt": "2024-07-02T09:00:00.500Z"
    },
    {
      "source": {"name": "CNBC"},
      "title": "Tesla update",
      "description": "Tesla holds its guidance.",
      "publishedAt": "2024-07-02T08:59:59.250Z"
    }
  ]
}"#;

async fn ingest_twice(store: &dyn RecordStore) -> (IngestReport, IngestReport, usize) {
    let news = FixtureNews::new(parse_articles(SUBSECOND_FEED).unwrap());
    let classifier = CountingClassifier::default();
    let r1 = run_news_once(&news, &classifier, store, "Tesla", "Tesla").await.unwrap();
    let r2 = run_news_once(&news, &classifier, store, "Tesla", "Tesla").await.unwrap();
    (r1, r2, classifier.calls.load(Ordering::SeqCst))
}

#[tokio::test]
async fn subsecond_feed_is_stable_across_runs_and_stores() {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteStore::open(dir.path().join("market.db")).unwrap();
    let memory = MemoryStore::new();

    let (s1, s2, s_calls) = ingest_twice(&sqlite).await;
    let (m1, m2, m_calls) = ingest_twice(&memory).await;

    // the two articles sharing a second collapse onto one key
    assert_eq!(s1.inserted, 2);
    assert_eq!(s1.duplicates, 1);
    assert_eq!(s2.inserted, 0);
    assert_eq!(s2.duplicates, 0);
    assert_eq!(s2.skipped_seen, 3);
    assert_eq!(s_calls, 3, "nothing is classified again on the second run");

    assert_eq!((m1, m2, m_calls), (s1, s2, s_calls));

    assert_eq!(sqlite.latest_timestamp("Tesla").unwrap(), Some(ts(2, 9, 0)));
    assert_eq!(memory.latest_timestamp("Tesla").unwrap(), Some(ts(2, 9, 0)));
    let from = ts(2, 0, 0);
    let to = ts(3, 0, 0);
    assert_eq!(
        sqlite.records_between("Tesla", from, to).unwrap(),
        memory.records_between("Tesla", from, to).unwrap()
    );
}

#[test]
fn memory_store_keys_on_whole_seconds() {
    let store = MemoryStore::new();
    let at = ts(2, 9, 0);
    let half = chrono::Duration::milliseconds(500);
    let mut a = record("Tesla", at + half, SentimentLabel::Positive, "Reuters");
    assert_eq!(store.insert_record(&a).unwrap(), InsertOutcome::Inserted);
    a.timestamp = at + chrono::Duration::milliseconds(700);
    assert_eq!(store.insert_record(&a).unwrap(), InsertOutcome::Duplicate);
    assert_eq!(store.latest_timestamp("Tesla").unwrap(), Some(at));
}
