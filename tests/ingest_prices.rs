// tests/ingest_prices.rs
mod common;

use std::sync::Arc;

use chrono::NaiveDate;

use common::{harness_with, FixtureNews, FixturePrices, NEWS_FIXTURE, PRICES_FIXTURE};
use stock_news_sentiment::config::PipelineConfig;
use stock_news_sentiment::sentiment::LexiconClassifier;
use stock_news_sentiment::store::PriceStore;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
}

fn cfg(symbols: &[&str]) -> PipelineConfig {
    let mut cfg = PipelineConfig::default();
    cfg.prices.symbols = symbols.iter().map(|s| s.to_string()).collect();
    cfg
}

fn prices(bad: Option<&str>) -> FixturePrices {
    let mut p = FixturePrices::from_body(PRICES_FIXTURE);
    p.bad_symbol = bad.map(str::to_string);
    p
}

#[tokio::test]
async fn first_run_stores_all_rows_second_run_none() {
    let h = harness_with(
        cfg(&["AAPL"]),
        FixtureNews::from_body(NEWS_FIXTURE),
        prices(None),
        Arc::new(LexiconClassifier::new()),
    );

    let r1 = h.pipeline.ingest_prices().await;
    assert_eq!(r1.symbols, 1);
    assert_eq!(r1.inserted, 3);
    assert!(r1.failed.is_empty());

    let rows = h.store.returns_for("AAPL").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].date, d(1));
    assert_eq!(rows[0].daily_return, 0.0);
    assert_eq!(rows[1].close_price, 220.0);
    assert!((rows[1].daily_return - 0.10).abs() < 1e-12);
    assert!((rows[2].daily_return - (221.55 / 220.0 - 1.0)).abs() < 1e-12);
    assert_eq!(h.store.latest_date("AAPL").unwrap(), Some(d(3)));

    let r2 = h.pipeline.ingest_prices().await;
    assert_eq!(r2.inserted, 0);
    assert_eq!(h.store.returns_for("AAPL").unwrap().len(), 3);
}

#[tokio::test]
async fn failing_symbol_does_not_stop_the_others() {
    let h = harness_with(
        cfg(&["BAD", "AAPL", "MSFT"]),
        FixtureNews::from_body(NEWS_FIXTURE),
        prices(Some("BAD")),
        Arc::new(LexiconClassifier::new()),
    );

    let r = h.pipeline.ingest_prices().await;
    assert_eq!(r.symbols, 3);
    assert_eq!(r.inserted, 6);
    assert_eq!(r.failed, vec!["BAD".to_string()]);
    assert!(h.store.returns_for("BAD").unwrap().is_empty());
    assert_eq!(h.store.returns_for("MSFT").unwrap().len(), 3);

    let err = h.pipeline.ingest_prices_strict().await.unwrap_err();
    assert!(err.to_string().contains("BAD"));
}

#[tokio::test]
async fn only_days_after_the_watermark_are_added() {
    let h = harness_with(
        cfg(&["AAPL"]),
        FixtureNews::from_body(NEWS_FIXTURE),
        prices(None),
        Arc::new(LexiconClassifier::new()),
    );
    // seed the first day only
    let seeded = stock_news_sentiment::analyze::daily_returns(
        "AAPL",
        &common::FixturePrices::from_body(PRICES_FIXTURE).bars[..1],
    );
    h.store.insert_returns(&seeded).unwrap();

    let r = h.pipeline.ingest_prices().await;
    assert_eq!(r.inserted, 2);

    let rows = h.store.returns_for("AAPL").unwrap();
    // the 07-02 return still uses the 07-01 close from the full series
    assert!((rows[1].daily_return - 0.10).abs() < 1e-12);
}
