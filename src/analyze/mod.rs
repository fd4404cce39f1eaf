// src/analyze/mod.rs
//! Analytics path: read a window of enriched records, aggregate, write the summary item.

pub mod keywords;
pub mod returns;
pub mod summary;

pub use returns::daily_returns;
pub use summary::Aggregator;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};

use crate::model::DailySummary;
use crate::store::{RecordStore, SummaryStore};

/// Summarize `asset` over `[now - window, now)` and overwrite its `(date, asset)` item.
pub fn run_daily_analysis(
    records: &dyn RecordStore,
    summaries: &dyn SummaryStore,
    aggregator: &Aggregator,
    asset: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<DailySummary> {
    let from = now - window;
    let window_records = records
        .records_between(asset, from, now)
        .with_context(|| format!("loading {asset} records since {from}"))?;

    let summary = aggregator.summarize(&window_records, asset, now);
    summaries
        .put_summary(&summary)
        .with_context(|| format!("storing summary for {asset} on {}", summary.date))?;

    counter!("analysis_runs_total").increment(1);
    gauge!("analysis_last_run_ts").set(now.timestamp() as f64);
    tracing::info!(
        target: "analyze",
        asset,
        date = %summary.date,
        records = summary.record_count,
        "daily summary stored"
    );
    Ok(summary)
}
