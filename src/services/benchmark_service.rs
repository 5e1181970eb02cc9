use futures::stream::{self, StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    Company, CompanyBenchmark, CompanyFilters, CompanyGrowth, GrowthDistributionResponse,
    MetricBenchmarkResponse,
};
use crate::services::metric_service::get_metric_across_portfolio;
use crate::services::metric_store::MetricStore;
use crate::services::numeric::extract_numeric_value;
use crate::services::periods::format_period_label;
use crate::services::portfolio_service::list_portfolio_companies;
use crate::services::stats;
use crate::services::value_format::format_metric_value;

const LOOKUP_CONCURRENCY: usize = 8;

/// Where each portfolio company sits in the distribution of one metric.
///
/// Companies without a numeric value are omitted (same policy as the
/// aggregate query path). An empty portfolio yields an empty payload, not an
/// error.
pub async fn metric_benchmarks(
    store: &dyn MetricStore,
    investor_id: Uuid,
    metric_name: &str,
) -> Result<MetricBenchmarkResponse, AppError> {
    let pairs =
        get_metric_across_portfolio(store, investor_id, metric_name, &CompanyFilters::default())
            .await?;

    let numeric: Vec<_> = pairs
        .iter()
        .filter_map(|(company, record)| {
            extract_numeric_value(&record.value).map(|v| (company, record, v))
        })
        .collect();
    let distribution: Vec<f64> = numeric.iter().map(|(_, _, v)| *v).collect();

    let companies = numeric
        .iter()
        .map(|(company, record, value)| CompanyBenchmark {
            company_id: company.id,
            company_name: company.name.clone(),
            value: *value,
            formatted_value: format_metric_value(*value, metric_name),
            period: format_period_label(record.period_start, &record.period_type),
            percentile: stats::percentile_rank(*value, &distribution),
        })
        .collect();

    Ok(MetricBenchmarkResponse {
        metric_name: metric_name.to_string(),
        companies,
        summary: stats::aggregate(&distribution),
    })
}

/// Period-over-period growth distribution for one metric across the
/// portfolio: per-company growth, the six-band histogram, and each company's
/// classification against the portfolio mean.
pub async fn growth_distribution(
    store: &dyn MetricStore,
    investor_id: Uuid,
    metric_name: &str,
) -> Result<GrowthDistributionResponse, AppError> {
    let companies =
        list_portfolio_companies(store, investor_id, &CompanyFilters::default()).await?;

    let growths: Vec<Option<(Company, f64)>> = stream::iter(companies)
        .map(|company| async move {
            let series = store.metric_series(company.id, metric_name).await?;
            Ok::<_, AppError>(latest_growth(&series).map(|g| (company, g)))
        })
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await?;
    let growths: Vec<(Company, f64)> = growths.into_iter().flatten().collect();

    let ratios: Vec<f64> = growths.iter().map(|(_, g)| *g).collect();
    let mean_growth = if ratios.is_empty() {
        None
    } else {
        Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
    };

    let companies = growths
        .into_iter()
        .map(|(company, growth)| CompanyGrowth {
            company_id: company.id,
            company_name: company.name,
            growth,
            classification: stats::classify_growth(growth, mean_growth.unwrap_or(0.0)),
        })
        .collect();

    Ok(GrowthDistributionResponse {
        metric_name: metric_name.to_string(),
        mean_growth,
        buckets: stats::growth_buckets(&ratios),
        companies,
    })
}

/// Growth between the two most recent numeric values of a series (oldest
/// first). Needs at least two usable points and a non-zero base.
fn latest_growth(series: &[crate::models::MetricRecord]) -> Option<f64> {
    let numeric: Vec<f64> = series
        .iter()
        .filter_map(|r| extract_numeric_value(&r.value))
        .collect();
    if numeric.len() < 2 {
        return None;
    }
    let latest = numeric[numeric.len() - 1];
    let previous = numeric[numeric.len() - 2];
    if previous == 0.0 {
        return None;
    }
    Some((latest - previous) / previous.abs())
}
