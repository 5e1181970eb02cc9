use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::{Company, CompanyFilters, MetricRecord};

/// Read-only access to portfolio companies and their metric records.
///
/// The executor and benchmark paths only ever read through this seam, which
/// keeps them testable against an in-memory double. Store faults surface as
/// `AppError::Db` and must propagate to the caller untouched; "no rows" is
/// `None`/empty, never an error.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Companies in the investor's approved relationship set, optionally
    /// narrowed by industry/stage. Empty when the investor has none.
    async fn portfolio_companies(
        &self,
        investor_id: Uuid,
        filters: &CompanyFilters,
    ) -> Result<Vec<Company>, AppError>;

    /// Latest reported record for a (company, metric) pair, metric name
    /// matched case-insensitively. `None` if never reported.
    async fn latest_metric_value(
        &self,
        company_id: Uuid,
        metric_name: &str,
    ) -> Result<Option<MetricRecord>, AppError>;

    /// Full series for a (company, metric) pair, oldest first.
    async fn metric_series(
        &self,
        company_id: Uuid,
        metric_name: &str,
    ) -> Result<Vec<MetricRecord>, AppError>;
}

/// Postgres-backed store used in production.
pub struct PgMetricStore {
    pool: PgPool,
}

impl PgMetricStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetricStore for PgMetricStore {
    async fn portfolio_companies(
        &self,
        investor_id: Uuid,
        filters: &CompanyFilters,
    ) -> Result<Vec<Company>, AppError> {
        db::company_queries::fetch_portfolio_companies(&self.pool, investor_id, filters)
            .await
            .map_err(AppError::Db)
    }

    async fn latest_metric_value(
        &self,
        company_id: Uuid,
        metric_name: &str,
    ) -> Result<Option<MetricRecord>, AppError> {
        db::metric_queries::fetch_latest_metric(&self.pool, company_id, metric_name)
            .await
            .map_err(AppError::Db)
    }

    async fn metric_series(
        &self,
        company_id: Uuid,
        metric_name: &str,
    ) -> Result<Vec<MetricRecord>, AppError> {
        db::metric_queries::fetch_metric_series(&self.pool, company_id, metric_name)
            .await
            .map_err(AppError::Db)
    }
}
