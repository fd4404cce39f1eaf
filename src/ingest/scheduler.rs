// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::pipeline::Pipeline;

#[derive(Clone, Copy, Debug)]
pub struct SchedulerCfg {
    pub ingest_interval_secs: u64,
    pub price_interval_secs: u64,
    pub analysis_interval_secs: u64,
}

impl From<&crate::config::ScheduleConfig> for SchedulerCfg {
    fn from(c: &crate::config::ScheduleConfig) -> Self {
        Self {
            ingest_interval_secs: c.ingest_interval_secs,
            price_interval_secs: c.price_interval_secs,
            analysis_interval_secs: c.analysis_interval_secs,
        }
    }
}

fn ticker(secs: u64) -> tokio::time::Interval {
    let mut t = tokio::time::interval(Duration::from_secs(secs.max(1)));
    t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    t
}

/// Spawn the periodic jobs. Each loop runs once immediately, then on its interval.
/// Failures are logged; the next tick retries from scratch.
pub fn spawn_jobs(pipeline: Arc<Pipeline>, cfg: SchedulerCfg) -> Vec<JoinHandle<()>> {
    let news = {
        let p = pipeline.clone();
        tokio::spawn(async move {
            let mut t = ticker(cfg.ingest_interval_secs);
            loop {
                t.tick().await;
                counter!("ingest_runs_total").increment(1);
                if let Err(e) = p.ingest_news().await {
                    tracing::warn!(
                        target: "ingest",
                        error = %format!("{e:#}"),
                        "news ingest tick failed"
                    );
                }
            }
        })
    };

    let prices = {
        let p = pipeline.clone();
        tokio::spawn(async move {
            let mut t = ticker(cfg.price_interval_secs);
            loop {
                t.tick().await;
                let report = p.ingest_prices().await;
                tracing::info!(
                    target: "ingest",
                    symbols = report.symbols,
                    inserted = report.inserted,
                    failed = report.failed.len(),
                    "price ingest tick"
                );
            }
        })
    };

    let analysis = tokio::spawn(async move {
        let mut t = ticker(cfg.analysis_interval_secs);
        loop {
            t.tick().await;
            let run = pipeline.clone().analyze_offloaded(chrono::Utc::now());
            if let Err(e) = run.await {
                tracing::warn!(
                    target: "analyze",
                    error = %format!("{e:#}"),
                    "analysis tick failed"
                );
            }
        }
    });

    vec![news, prices, analysis]
}
