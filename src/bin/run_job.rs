//! Run one pipeline job and exit, for cron-style schedulers.
//!
//! Usage: `run_job <ingest|prices|analyze>`

use anyhow::{bail, Result};
use stock_news_sentiment::config::{self, Secrets};
use stock_news_sentiment::pipeline::Pipeline;
use stock_news_sentiment::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let job = std::env::args().nth(1).unwrap_or_default();
    let cfg = config::load_default()?;
    let pipeline = Pipeline::from_config(cfg, &Secrets::from_env())?;

    match job.as_str() {
        "ingest" => {
            let r = pipeline.ingest_news().await?;
            println!("{}", serde_json::to_string_pretty(&r)?);
        }
        "prices" => {
            let r = pipeline.ingest_prices_strict().await?;
            println!("{}", serde_json::to_string_pretty(&r)?);
        }
        "analyze" => {
            let s = pipeline.analyze(chrono::Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&s)?);
        }
        other => bail!("unknown job {other:?}; expected ingest, prices or analyze"),
    }
    Ok(())
}
