// src/metrics.rs
//! Prometheus exposition for the pipeline's `metrics` series.
//!
//! Ingest series are described in `ingest`; this module owns the recorder and
//! the analysis-side series, and publishes the analysis settings as gauges so
//! dashboards can tell which window a summary was computed over.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::config::AnalysisConfig;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide recorder. Fails if one is already installed.
    pub fn init(analysis: &AnalysisConfig) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        describe_counter!("analysis_runs_total", "Daily summaries computed and stored.");
        describe_gauge!(
            "analysis_last_run_ts",
            "Unix ts of the `now` the last summary was computed for."
        );
        describe_gauge!("analysis_window_hours", "Look-back window of each summary.");
        describe_gauge!("analysis_top_n", "Rows kept in the top sources/keywords tables.");

        gauge!("analysis_window_hours").set(analysis.window_hours as f64);
        gauge!("analysis_top_n").set(analysis.top_n as f64);

        Ok(Self { handle })
    }

    /// Current exposition text.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// `GET /metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
