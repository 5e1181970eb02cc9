use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{GrowthDistributionResponse, MetricBenchmarkResponse};
use crate::services::benchmark_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/investors/:investor_id/metrics/:metric", get(metric_benchmarks))
        .route("/investors/:investor_id/metrics/:metric/growth", get(growth_distribution))
}

/// GET /api/benchmarks/investors/:investor_id/metrics/:metric
///
/// Latest value and percentile rank per portfolio company, plus summary
/// statistics over the distribution.
async fn metric_benchmarks(
    Path((investor_id, metric)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<MetricBenchmarkResponse>, AppError> {
    info!("GET /api/benchmarks/investors/{}/metrics/{}", investor_id, metric);

    let response =
        benchmark_service::metric_benchmarks(state.metric_store.as_ref(), investor_id, &metric)
            .await?;

    Ok(Json(response))
}

/// GET /api/benchmarks/investors/:investor_id/metrics/:metric/growth
///
/// Period-over-period growth per company, six-band histogram, and
/// outperform/underperform classification against the portfolio mean.
async fn growth_distribution(
    Path((investor_id, metric)): Path<(Uuid, String)>,
    State(state): State<AppState>,
) -> Result<Json<GrowthDistributionResponse>, AppError> {
    info!("GET /api/benchmarks/investors/{}/metrics/{}/growth", investor_id, metric);

    let response =
        benchmark_service::growth_distribution(state.metric_store.as_ref(), investor_id, &metric)
            .await?;

    Ok(Json(response))
}
