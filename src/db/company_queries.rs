use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Company, CompanyFilters};

/// Companies in the investor's approved relationship set.
///
/// Anything with a relationship row whose status is not 'denied' counts as
/// part of the portfolio; pending relationships still show up so dashboards
/// reflect what the investor has requested. Industry/stage filters are
/// case-insensitive. No relationships means an empty list, never an error.
pub async fn fetch_portfolio_companies(
    pool: &PgPool,
    investor_id: Uuid,
    filters: &CompanyFilters,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT c.id, c.name, c.industry, c.stage
         FROM companies c
         JOIN investor_company_relationships r ON r.company_id = c.id
         WHERE r.investor_id = $1
           AND r.status <> 'denied'
           AND ($2::text IS NULL OR LOWER(c.industry) = LOWER($2))
           AND ($3::text IS NULL OR LOWER(c.stage) = LOWER($3))
         ORDER BY c.name ASC",
    )
    .bind(investor_id)
    .bind(filters.industry.as_deref())
    .bind(filters.stage.as_deref())
    .fetch_all(pool)
    .await
}
