// src/api.rs
//! HTTP surface: summary query, manual job triggers, health.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::ingest::{IngestReport, PriceReport};
use crate::model::DailySummary;
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/summaries", get(list_summaries))
        .route("/jobs/ingest", post(run_ingest))
        .route("/jobs/prices", post(run_prices))
        .route("/jobs/analyze", post(run_analyze))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Any failure becomes a 500 with the error chain echoed back.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let msg = format!("{:#}", self.0);
        tracing::warn!(error = %msg, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { error: msg }),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryFilter {
    pub asset: Option<String>,
    pub date: Option<NaiveDate>,
}

async fn list_summaries(
    State(state): State<AppState>,
    Query(filter): Query<SummaryFilter>,
) -> Result<Json<Vec<DailySummary>>, ApiError> {
    let items = state.pipeline.summaries_offloaded().await?;
    let out = items
        .into_iter()
        .filter(|s| {
            filter
                .asset
                .as_deref()
                .map_or(true, |a| s.asset.eq_ignore_ascii_case(a))
        })
        .filter(|s| filter.date.map_or(true, |d| s.date == d))
        .collect();
    Ok(Json(out))
}

#[derive(Serialize)]
struct JobResponse<T: Serialize> {
    status: &'static str,
    message: String,
    report: T,
}

fn success<T: Serialize>(message: impl Into<String>, report: T) -> Json<JobResponse<T>> {
    Json(JobResponse {
        status: "success",
        message: message.into(),
        report,
    })
}

async fn run_ingest(
    State(state): State<AppState>,
) -> Result<Json<JobResponse<IngestReport>>, ApiError> {
    let report = state.pipeline.ingest_news().await?;
    Ok(success(
        format!("Stored {} new articles", report.inserted),
        report,
    ))
}

async fn run_prices(
    State(state): State<AppState>,
) -> Result<Json<JobResponse<PriceReport>>, ApiError> {
    let report = state.pipeline.ingest_prices_strict().await?;
    Ok(success(
        format!("Stored {} daily return rows", report.inserted),
        report,
    ))
}

async fn run_analyze(
    State(state): State<AppState>,
) -> Result<Json<JobResponse<DailySummary>>, ApiError> {
    let summary = state
        .pipeline
        .clone()
        .analyze_offloaded(chrono::Utc::now())
        .await?;
    Ok(success("Data analyzed and stored", summary))
}
