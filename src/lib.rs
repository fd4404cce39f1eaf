// src/lib.rs
// Public library surface for the service binary, the job runner and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod sentiment;
pub mod store;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::model::{DailySummary, EnrichedRecord, RawArticle, SentimentLabel};
pub use crate::pipeline::Pipeline;
