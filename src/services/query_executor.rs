use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AggregateKind, ChartPoint, Company, CompanyFilters, MetricRecord, QueryResult, RankOrder,
    StructuredQuery,
};
use crate::services::metric_service::get_metric_across_portfolio;
use crate::services::metric_store::MetricStore;
use crate::services::numeric::extract_numeric_value;
use crate::services::periods::format_period_label;
use crate::services::portfolio_service::find_company_by_name;
use crate::services::query_interpreter::EXAMPLE_QUESTIONS;
use crate::services::stats;
use crate::services::value_format::format_metric_value;

/// Execute a structured query against the investor's portfolio.
///
/// Single-shot dispatch, read-only, idempotent. Business-logic conditions
/// (missing params, unknown company, absent metric, empty portfolio) are
/// successful results with explanatory answers; only store faults return
/// `Err`, and those propagate untouched so an outage never masquerades as
/// "you have no data".
pub async fn execute_query(
    store: &dyn MetricStore,
    investor_id: Uuid,
    query: StructuredQuery,
) -> Result<QueryResult, AppError> {
    info!("Executing {} query for investor {}", query.type_name(), investor_id);

    match query {
        StructuredQuery::MetricLookup { company_name, metric_name } => {
            execute_metric_lookup(store, investor_id, company_name, metric_name).await
        }
        StructuredQuery::Comparison { company_names, metric_name } => {
            execute_comparison(store, investor_id, company_names, metric_name).await
        }
        StructuredQuery::Aggregation { metric_name, aggregation, filters } => {
            execute_aggregation(store, investor_id, metric_name, aggregation, filters).await
        }
        StructuredQuery::Ranking { metric_name, order, limit, filters } => {
            execute_ranking(store, investor_id, metric_name, order, limit, filters).await
        }
        StructuredQuery::Unknown { reason } => Ok(execute_unknown(reason)),
    }
}

async fn execute_metric_lookup(
    store: &dyn MetricStore,
    investor_id: Uuid,
    company_name: Option<String>,
    metric_name: Option<String>,
) -> Result<QueryResult, AppError> {
    let (company_name, metric_name) = match (company_name, metric_name) {
        (Some(c), Some(m)) if !c.trim().is_empty() && !m.trim().is_empty() => (c, m),
        _ => {
            return Ok(QueryResult::answer_only(
                "metric_lookup",
                "Please name both a company and a metric, e.g. \"What is Acme's revenue?\"",
            ))
        }
    };

    let company = match find_company_by_name(store, investor_id, &company_name).await? {
        Some(company) => company,
        None => {
            return Ok(QueryResult::answer_only(
                "metric_lookup",
                format!("I couldn't find a company named \"{}\" in your portfolio.", company_name),
            ))
        }
    };

    let record = match store.latest_metric_value(company.id, &metric_name).await? {
        Some(record) => record,
        None => {
            return Ok(QueryResult::answer_only(
                "metric_lookup",
                format!("No {} data has been reported for {}.", metric_name, company.name),
            ))
        }
    };

    let period = format_period_label(record.period_start, &record.period_type);
    let formatted = match extract_numeric_value(&record.value) {
        Some(v) => format_metric_value(v, &record.metric_name),
        // Non-numeric submissions still get surfaced as-is for a direct lookup.
        None => record.value.as_str().unwrap_or("n/a").to_string(),
    };

    Ok(QueryResult {
        query_type: "metric_lookup".to_string(),
        answer: format!("{}'s {} was {} in {}.", company.name, record.metric_name, formatted, period),
        data: Some(vec![json!({
            "company": company.name,
            "metric": record.metric_name,
            "value": record.value,
            "period": period,
        })]),
        chart_data: None,
    })
}

/// Per-entity outcome for the comparison branch. Unlike the portfolio-wide
/// fan-out, comparison retains failures: the user named these companies and
/// must see each one accounted for.
enum ComparisonOutcome {
    NotFound,
    NoValue(Company),
    Value(Company, MetricRecord, f64),
}

async fn execute_comparison(
    store: &dyn MetricStore,
    investor_id: Uuid,
    company_names: Vec<String>,
    metric_name: Option<String>,
) -> Result<QueryResult, AppError> {
    let metric_name = metric_name.unwrap_or_default();
    if company_names.len() < 2 || metric_name.trim().is_empty() {
        return Ok(QueryResult::answer_only(
            "comparison",
            "Please name at least two companies and a metric, e.g. \"Compare revenue for Acme and Globex\".",
        ));
    }

    let mut outcomes = Vec::with_capacity(company_names.len());
    for name in &company_names {
        let outcome = match find_company_by_name(store, investor_id, name).await? {
            None => ComparisonOutcome::NotFound,
            Some(company) => match store.latest_metric_value(company.id, &metric_name).await? {
                None => ComparisonOutcome::NoValue(company),
                Some(record) => match extract_numeric_value(&record.value) {
                    Some(v) => ComparisonOutcome::Value(company, record, v),
                    None => ComparisonOutcome::NoValue(company),
                },
            },
        };
        outcomes.push(outcome);
    }

    let mut rows = Vec::with_capacity(outcomes.len());
    let mut chart = Vec::new();
    let mut lines = Vec::with_capacity(outcomes.len());
    for (name, outcome) in company_names.iter().zip(&outcomes) {
        match outcome {
            ComparisonOutcome::Value(company, record, value) => {
                let period = format_period_label(record.period_start, &record.period_type);
                let formatted = format_metric_value(*value, &metric_name);
                lines.push(format!("{}: {} ({})", company.name, formatted, period));
                rows.push(json!({
                    "company": company.name,
                    "value": value,
                    "period": period,
                }));
                chart.push(ChartPoint { label: company.name.clone(), value: *value });
            }
            ComparisonOutcome::NoValue(company) => {
                lines.push(format!("{}: no data", company.name));
                rows.push(json!({
                    "company": company.name,
                    "value": null,
                    "period": "N/A",
                }));
            }
            ComparisonOutcome::NotFound => {
                lines.push(format!("{}: not in your portfolio", name));
                rows.push(json!({
                    "company": name,
                    "value": null,
                    "period": "N/A",
                }));
            }
        }
    }

    if chart.is_empty() {
        return Ok(QueryResult::answer_only(
            "comparison",
            format!("I couldn't find {} data for any of the requested companies.", metric_name),
        ));
    }

    Ok(QueryResult {
        query_type: "comparison".to_string(),
        answer: format!("Comparing {}:\n{}", metric_name, lines.join("\n")),
        data: Some(rows),
        chart_data: Some(chart),
    })
}

async fn execute_aggregation(
    store: &dyn MetricStore,
    investor_id: Uuid,
    metric_name: Option<String>,
    aggregation: AggregateKind,
    filters: CompanyFilters,
) -> Result<QueryResult, AppError> {
    let metric_name = match metric_name {
        Some(m) if !m.trim().is_empty() => m,
        _ => {
            return Ok(QueryResult::answer_only(
                "aggregation",
                "Please name a metric to aggregate, e.g. \"What's the average burn rate?\"",
            ))
        }
    };

    let pairs = get_metric_across_portfolio(store, investor_id, &metric_name, &filters).await?;
    if pairs.is_empty() {
        return Ok(QueryResult::answer_only(
            "aggregation",
            format!("No {} data found across your portfolio{}.", metric_name, filters.describe()),
        ));
    }

    let numeric: Vec<(&Company, &MetricRecord, f64)> = pairs
        .iter()
        .filter_map(|(company, record)| {
            extract_numeric_value(&record.value).map(|v| (company, record, v))
        })
        .collect();

    // Records existed but none carried a usable number. Distinct from the
    // no-data case above so callers can tell the two apart.
    if numeric.is_empty() {
        return Ok(QueryResult::answer_only(
            "aggregation",
            format!(
                "I found {} records for your portfolio, but none had usable numeric values.",
                metric_name
            ),
        ));
    }

    let values: Vec<f64> = numeric.iter().map(|(_, _, v)| *v).collect();
    let summary = stats::aggregate(&values)
        .ok_or_else(|| AppError::Validation("aggregate over empty sample".to_string()))?;
    let statistic = match aggregation {
        AggregateKind::Average => summary.average,
        AggregateKind::Sum => summary.sum,
        AggregateKind::Median => summary.median,
        AggregateKind::Min => summary.min,
        AggregateKind::Max => summary.max,
    };

    let rows = numeric
        .iter()
        .map(|(company, record, value)| {
            json!({
                "company": company.name,
                "value": value,
                "period": format_period_label(record.period_start, &record.period_type),
            })
        })
        .collect();
    let chart = numeric
        .iter()
        .map(|(company, _, value)| ChartPoint { label: company.name.clone(), value: *value })
        .collect();

    Ok(QueryResult {
        query_type: "aggregation".to_string(),
        answer: format!(
            "The {} {} across your portfolio{} is {} (based on {} companies).",
            aggregation,
            metric_name,
            filters.describe(),
            format_metric_value(statistic, &metric_name),
            summary.count,
        ),
        data: Some(rows),
        chart_data: Some(chart),
    })
}

async fn execute_ranking(
    store: &dyn MetricStore,
    investor_id: Uuid,
    metric_name: Option<String>,
    order: RankOrder,
    limit: usize,
    filters: CompanyFilters,
) -> Result<QueryResult, AppError> {
    let metric_name = match metric_name {
        Some(m) if !m.trim().is_empty() => m,
        _ => {
            return Ok(QueryResult::answer_only(
                "ranking",
                "Please name a metric to rank by, e.g. \"Top 5 companies by revenue\".",
            ))
        }
    };
    let limit = limit.max(1);

    let pairs = get_metric_across_portfolio(store, investor_id, &metric_name, &filters).await?;
    if pairs.is_empty() {
        return Ok(QueryResult::answer_only(
            "ranking",
            format!("No {} data found across your portfolio{}.", metric_name, filters.describe()),
        ));
    }

    // A null can't be placed in an order; drop non-numeric values pre-rank.
    let mut ranked: Vec<(&Company, &MetricRecord, f64)> = pairs
        .iter()
        .filter_map(|(company, record)| {
            extract_numeric_value(&record.value).map(|v| (company, record, v))
        })
        .collect();
    if ranked.is_empty() {
        return Ok(QueryResult::answer_only(
            "ranking",
            format!(
                "I found {} records for your portfolio, but none had usable numeric values.",
                metric_name
            ),
        ));
    }

    // Stable sort: ties keep portfolio encounter order.
    match order {
        RankOrder::Top => ranked.sort_by(|a, b| b.2.total_cmp(&a.2)),
        RankOrder::Bottom => ranked.sort_by(|a, b| a.2.total_cmp(&b.2)),
    }
    ranked.truncate(limit);

    let order_word = match order {
        RankOrder::Top => "Top",
        RankOrder::Bottom => "Bottom",
    };
    let lines: Vec<String> = ranked
        .iter()
        .enumerate()
        .map(|(i, (company, record, value))| {
            format!(
                "{}. {}: {} ({})",
                i + 1,
                company.name,
                format_metric_value(*value, &metric_name),
                format_period_label(record.period_start, &record.period_type),
            )
        })
        .collect();

    let rows = ranked
        .iter()
        .enumerate()
        .map(|(i, (company, record, value))| {
            json!({
                "rank": i + 1,
                "company": company.name,
                "value": value,
                "period": format_period_label(record.period_start, &record.period_type),
            })
        })
        .collect();
    let chart = ranked
        .iter()
        .map(|(company, _, value)| ChartPoint { label: company.name.clone(), value: *value })
        .collect();

    Ok(QueryResult {
        query_type: "ranking".to_string(),
        answer: format!(
            "{} {} companies by {}{}:\n{}",
            order_word,
            ranked.len(),
            metric_name,
            filters.describe(),
            lines.join("\n"),
        ),
        data: Some(rows),
        chart_data: Some(chart),
    })
}

fn execute_unknown(reason: String) -> QueryResult {
    let reason = if reason.trim().is_empty() {
        "I couldn't understand that question.".to_string()
    } else {
        reason
    };
    QueryResult::answer_only("unknown", format!("{} {}", reason, EXAMPLE_QUESTIONS))
}
