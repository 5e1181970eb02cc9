use sqlx::PgPool;
use uuid::Uuid;

use crate::models::MetricRecord;

/// Latest reported record for a (company, metric) pair.
///
/// Metric names match case-insensitively. "Latest" means greatest
/// `period_end`, with `period_start DESC` as the explicit tie-break so equal
/// period ends resolve deterministically instead of by row order.
pub async fn fetch_latest_metric(
    pool: &PgPool,
    company_id: Uuid,
    metric_name: &str,
) -> Result<Option<MetricRecord>, sqlx::Error> {
    sqlx::query_as::<_, MetricRecord>(
        "SELECT company_id, metric_name, value, period_type, period_start, period_end
         FROM metric_records
         WHERE company_id = $1 AND LOWER(metric_name) = LOWER($2)
         ORDER BY period_end DESC, period_start DESC
         LIMIT 1",
    )
    .bind(company_id)
    .bind(metric_name)
    .fetch_optional(pool)
    .await
}

/// Full reported series for a (company, metric) pair, oldest first.
/// Used for period-over-period growth.
pub async fn fetch_metric_series(
    pool: &PgPool,
    company_id: Uuid,
    metric_name: &str,
) -> Result<Vec<MetricRecord>, sqlx::Error> {
    sqlx::query_as::<_, MetricRecord>(
        "SELECT company_id, metric_name, value, period_type, period_start, period_end
         FROM metric_records
         WHERE company_id = $1 AND LOWER(metric_name) = LOWER($2)
         ORDER BY period_end ASC, period_start ASC",
    )
    .bind(company_id)
    .bind(metric_name)
    .fetch_all(pool)
    .await
}
