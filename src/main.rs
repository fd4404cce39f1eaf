//! Stock news sentiment service: binary entrypoint.
//! Boots the Axum query API and spawns the periodic ingest/analysis jobs.

use std::sync::Arc;

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing::info;

use stock_news_sentiment::config::{self, Secrets};
use stock_news_sentiment::ingest::scheduler::{spawn_jobs, SchedulerCfg};
use stock_news_sentiment::metrics::Metrics;
use stock_news_sentiment::{api, telemetry, AppState, Pipeline};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cfg = config::load_default().context("loading pipeline config")?;
    let secrets = Secrets::from_env();
    info!(
        query = %cfg.news.query,
        asset = cfg.news.asset(),
        symbols = ?cfg.prices.symbols,
        classifier = ?cfg.sentiment.provider,
        secrets = ?secrets,
        "pipeline config loaded"
    );

    let metrics = Metrics::init(&cfg.analysis)?;
    let schedule = cfg.schedule.clone();
    let pipeline = Arc::new(Pipeline::from_config(cfg, &secrets)?);

    if schedule.enabled {
        let handles = spawn_jobs(pipeline.clone(), SchedulerCfg::from(&schedule));
        info!(jobs = handles.len(), "scheduler started");
    } else {
        info!("scheduler disabled; jobs run only via /jobs/*");
    }

    let router = api::router(AppState { pipeline }).merge(metrics.router());
    Ok(router.into())
}
