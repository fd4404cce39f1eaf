// src/store/memory.rs
use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use super::{PriceStore, RecordStore, SummaryStore};
use crate::model::{to_record_ts, DailyReturn, DailySummary, EnrichedRecord, InsertOutcome};

/// In-process store used by tests and local runs without a database file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<(String, DateTime<Utc>), EnrichedRecord>>,
    prices: Mutex<BTreeMap<(String, NaiveDate), DailyReturn>>,
    summaries: Mutex<BTreeMap<(NaiveDate, String), DailySummary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().expect("records mutex poisoned").len()
    }
}

impl RecordStore for MemoryStore {
    fn latest_timestamp(&self, asset: &str) -> Result<Option<DateTime<Utc>>> {
        let g = self.records.lock().expect("records mutex poisoned");
        Ok(g.keys()
            .filter(|(a, _)| a == asset)
            .map(|(_, ts)| *ts)
            .max())
    }

    fn insert_record(&self, record: &EnrichedRecord) -> Result<InsertOutcome> {
        let mut g = self.records.lock().expect("records mutex poisoned");
        // same whole-second key the sqlite table uses
        let timestamp = to_record_ts(record.timestamp);
        let key = (record.asset.clone(), timestamp);
        if g.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }
        g.insert(
            key,
            EnrichedRecord {
                timestamp,
                ..record.clone()
            },
        );
        Ok(InsertOutcome::Inserted)
    }

    fn records_between(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EnrichedRecord>> {
        let g = self.records.lock().expect("records mutex poisoned");
        Ok(g.iter()
            .filter(|((a, ts), _)| a == asset && *ts >= from && *ts < to)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl PriceStore for MemoryStore {
    fn latest_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let g = self.prices.lock().expect("prices mutex poisoned");
        Ok(g.keys()
            .filter(|(s, _)| s == symbol)
            .map(|(_, d)| *d)
            .max())
    }

    fn insert_returns(&self, rows: &[DailyReturn]) -> Result<usize> {
        let mut g = self.prices.lock().expect("prices mutex poisoned");
        let mut written = 0;
        for row in rows {
            let key = (row.symbol.clone(), row.date);
            if !g.contains_key(&key) {
                g.insert(key, row.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    fn returns_for(&self, symbol: &str) -> Result<Vec<DailyReturn>> {
        let g = self.prices.lock().expect("prices mutex poisoned");
        Ok(g.iter()
            .filter(|((s, _), _)| s == symbol)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

impl SummaryStore for MemoryStore {
    fn put_summary(&self, summary: &DailySummary) -> Result<()> {
        let mut g = self.summaries.lock().expect("summaries mutex poisoned");
        g.insert((summary.date, summary.asset.clone()), summary.clone());
        Ok(())
    }

    fn scan(&self) -> Result<Vec<DailySummary>> {
        let g = self.summaries.lock().expect("summaries mutex poisoned");
        Ok(g.values().cloned().collect())
    }
}
