use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Company, CompanyFilters};
use crate::services::metric_store::MetricStore;

/// Companies the investor may see, optionally filtered.
pub async fn list_portfolio_companies(
    store: &dyn MetricStore,
    investor_id: Uuid,
    filters: &CompanyFilters,
) -> Result<Vec<Company>, AppError> {
    store.portfolio_companies(investor_id, filters).await
}

/// Resolve a user-supplied company name within the investor's portfolio.
///
/// Case-insensitive exact match only. No fuzzy or partial matching: a
/// near-miss must come back `None` rather than silently attributing numbers
/// to the wrong company.
pub async fn find_company_by_name(
    store: &dyn MetricStore,
    investor_id: Uuid,
    name: &str,
) -> Result<Option<Company>, AppError> {
    let companies = store
        .portfolio_companies(investor_id, &CompanyFilters::default())
        .await?;
    let wanted = name.trim();
    Ok(companies
        .into_iter()
        .find(|c| c.name.trim().eq_ignore_ascii_case(wanted)))
}
