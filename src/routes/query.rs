use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{PortfolioQuestion, QueryResult};
use crate::services::query_executor;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/investors/:investor_id/ask", post(ask_question))
}

/// POST /api/query/investors/:investor_id/ask
///
/// Interpret a natural-language portfolio question and execute it.
///
/// Request body: { "question": "What's the average burn rate?" }
///
/// Always answers: questions the interpreter cannot understand come back as
/// an unknown-typed result with suggestions, not an error. Store faults are
/// the only 5xx path.
async fn ask_question(
    Path(investor_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<PortfolioQuestion>,
) -> Result<Json<QueryResult>, AppError> {
    info!(
        "POST /api/query/investors/{}/ask - Question: {}",
        investor_id, body.question
    );

    let query = state.interpreter.parse_query(investor_id, &body.question).await;

    let result = query_executor::execute_query(state.metric_store.as_ref(), investor_id, query)
        .await
        .map_err(|e| {
            error!("Failed to execute query: {}", e);
            e
        })?;

    info!("Answered question with {} result", result.query_type);

    Ok(Json(result))
}
