use std::sync::Arc;

use sqlx::PgPool;

use crate::services::metric_store::MetricStore;
use crate::services::query_interpreter::QueryInterpreter;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub metric_store: Arc<dyn MetricStore>,
    pub interpreter: Arc<QueryInterpreter>,
}
