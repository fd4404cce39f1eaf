// src/store/mod.rs
//! Persistence seams: document collections for ingestion, a key-value table for summaries.
//!
//! Every store is constructed by the caller and handed to the jobs, so tests can swap in
//! [`MemoryStore`] where production uses [`SqliteStore`].

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{DailyReturn, DailySummary, EnrichedRecord, InsertOutcome};

/// News sentiment collection, keyed by `(asset, timestamp)`.
pub trait RecordStore: Send + Sync {
    /// Highest persisted timestamp for `asset`, if any.
    fn latest_timestamp(&self, asset: &str) -> Result<Option<DateTime<Utc>>>;

    fn insert_record(&self, record: &EnrichedRecord) -> Result<InsertOutcome>;

    /// Records for `asset` with `from <= timestamp < to`, oldest first.
    fn records_between(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EnrichedRecord>>;
}

/// Price analysis collection, keyed by `(symbol, date)`.
pub trait PriceStore: Send + Sync {
    fn latest_date(&self, symbol: &str) -> Result<Option<NaiveDate>>;

    /// Returns how many rows were actually written.
    fn insert_returns(&self, rows: &[DailyReturn]) -> Result<usize>;

    fn returns_for(&self, symbol: &str) -> Result<Vec<DailyReturn>>;
}

/// Analytics table, one item per `(date, asset)`; writes overwrite.
pub trait SummaryStore: Send + Sync {
    fn put_summary(&self, summary: &DailySummary) -> Result<()>;

    /// Every stored item, ordered by date then asset.
    fn scan(&self) -> Result<Vec<DailySummary>>;
}
