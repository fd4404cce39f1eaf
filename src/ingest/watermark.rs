// src/ingest/watermark.rs
//! Deduplication gate: a per-entity high-water mark over persisted timestamps.
//!
//! A candidate is new iff nothing has been persisted for the entity yet, or its
//! timestamp is strictly greater than the mark. Late arrivals older than the
//! mark are dropped; the feed is assumed to be roughly chronological.
//!
//! The mark is read once per run and never advanced while the run inserts,
//! so every record of one fetch is judged against the same pre-run state.
//! Reading and inserting are not one transaction: two concurrent runs for the
//! same entity can both pass the gate. The stores' `(entity, timestamp)` key
//! turns that race into a reported duplicate rather than a second copy.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::store::{PriceStore, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark<T>(Option<T>);

impl<T: Ord + Copy> Watermark<T> {
    /// Nothing persisted yet: everything is new.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn at(mark: T) -> Self {
        Self(Some(mark))
    }

    pub fn from_latest(latest: Option<T>) -> Self {
        Self(latest)
    }

    pub fn mark(&self) -> Option<T> {
        self.0
    }

    pub fn is_new(&self, candidate: T) -> bool {
        match self.0 {
            None => true,
            Some(mark) => candidate > mark,
        }
    }
}

pub fn news_watermark(store: &dyn RecordStore, asset: &str) -> Result<Watermark<DateTime<Utc>>> {
    let latest = store
        .latest_timestamp(asset)
        .with_context(|| format!("reading news watermark for {asset}"))?;
    Ok(Watermark::from_latest(latest))
}

pub fn price_watermark(store: &dyn PriceStore, symbol: &str) -> Result<Watermark<NaiveDate>> {
    let latest = store
        .latest_date(symbol)
        .with_context(|| format!("reading price watermark for {symbol}"))?;
    Ok(Watermark::from_latest(latest))
}
