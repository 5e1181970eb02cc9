use axum::Router;
use tower_http::cors::CorsLayer;

use crate::routes::{benchmarks, health, query};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/query", query::router())
        .nest("/api/benchmarks", benchmarks::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
