mod app;
mod db;
mod errors;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::services::llm_service::{LlmConfig, LlmService};
use crate::services::metric_store::PgMetricStore;
use crate::services::query_interpreter::QueryInterpreter;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    logging::init_logging(logging::LoggingConfig::from_env())?;

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;

    let llm_service = Arc::new(LlmService::new(LlmConfig::from_env()));
    if !llm_service.is_enabled() {
        tracing::warn!("LLM service disabled; questions will answer as not understood");
    }

    let state = AppState {
        metric_store: Arc::new(PgMetricStore::new(pool.clone())),
        interpreter: Arc::new(QueryInterpreter::new(llm_service)),
        pool,
    };
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Folioquery backend running at http://{}/", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
