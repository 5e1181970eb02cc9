use futures::stream::{self, StreamExt, TryStreamExt};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Company, CompanyFilters, MetricRecord};
use crate::services::metric_store::MetricStore;
use crate::services::portfolio_service::list_portfolio_companies;

/// Per-company lookups run concurrently, bounded so a large portfolio does
/// not stampede the store. `buffered` (not `buffer_unordered`) keeps results
/// in portfolio order, which ranking relies on for stable tie-breaks.
const LOOKUP_CONCURRENCY: usize = 8;

/// Latest value of one metric across the investor's portfolio.
///
/// Fans out one latest-value lookup per company; companies that never
/// reported the metric are silently omitted, so one absent metric cannot
/// abort an aggregate over the rest of the portfolio. Store faults are the
/// one thing that does propagate.
pub async fn get_metric_across_portfolio(
    store: &dyn MetricStore,
    investor_id: Uuid,
    metric_name: &str,
    filters: &CompanyFilters,
) -> Result<Vec<(Company, MetricRecord)>, AppError> {
    let companies = list_portfolio_companies(store, investor_id, filters).await?;

    let pairs: Vec<Option<(Company, MetricRecord)>> = stream::iter(companies)
        .map(|company| async move {
            let record = store.latest_metric_value(company.id, metric_name).await?;
            Ok::<_, AppError>(record.map(|r| (company, r)))
        })
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await?;

    Ok(pairs.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::services::metric_store::testing::InMemoryMetricStore;

    fn company(name: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            industry: None,
            stage: None,
        }
    }

    fn record(company_id: Uuid, metric: &str, value: serde_json::Value, end: &str) -> MetricRecord {
        let period_end = end.parse::<NaiveDate>().unwrap();
        MetricRecord {
            company_id,
            metric_name: metric.to_string(),
            value,
            period_type: "quarterly".to_string(),
            period_start: period_end - chrono::Days::new(89),
            period_end,
        }
    }

    #[tokio::test]
    async fn test_companies_without_metric_are_omitted() {
        let acme = company("Acme");
        let globex = company("Globex");
        let mut records = HashMap::new();
        records.insert(acme.id, vec![record(acme.id, "Revenue", json!(100), "2025-06-30")]);

        let store = InMemoryMetricStore {
            companies: vec![acme.clone(), globex],
            records,
        };

        let result = get_metric_across_portfolio(
            &store,
            Uuid::new_v4(),
            "revenue",
            &CompanyFilters::default(),
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0.name, "Acme");
    }

    #[tokio::test]
    async fn test_results_keep_portfolio_order() {
        let names = ["Delta", "Acme", "Zeus"];
        let companies: Vec<Company> = names.iter().map(|n| company(n)).collect();
        let mut records = HashMap::new();
        for c in &companies {
            records.insert(c.id, vec![record(c.id, "Revenue", json!(1), "2025-06-30")]);
        }
        let store = InMemoryMetricStore { companies, records };

        let result = get_metric_across_portfolio(
            &store,
            Uuid::new_v4(),
            "Revenue",
            &CompanyFilters::default(),
        )
        .await
        .unwrap();

        let ordered: Vec<&str> = result.iter().map(|(c, _)| c.name.as_str()).collect();
        assert_eq!(ordered, names);
    }

    #[tokio::test]
    async fn test_fan_out_respects_portfolio_filters() {
        let mut acme = company("Acme");
        acme.industry = Some("Fintech".to_string());
        let globex = company("Globex");
        let mut records = HashMap::new();
        records.insert(acme.id, vec![record(acme.id, "MRR", json!(100), "2025-06-30")]);
        records.insert(globex.id, vec![record(globex.id, "MRR", json!(200), "2025-06-30")]);

        let store = InMemoryMetricStore {
            companies: vec![acme, globex],
            records,
        };
        let filters = CompanyFilters {
            industry: Some("fintech".to_string()),
            stage: None,
        };

        let result = get_metric_across_portfolio(&store, Uuid::new_v4(), "MRR", &filters)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].0.name, "Acme");
    }

    #[tokio::test]
    async fn test_latest_period_tie_breaks_on_period_start() {
        let acme = company("Acme");
        let mut records = HashMap::new();
        let mut older = record(acme.id, "Revenue", json!(1), "2025-06-30");
        older.period_start = "2025-01-01".parse().unwrap();
        let mut newer = record(acme.id, "Revenue", json!(2), "2025-06-30");
        newer.period_start = "2025-04-01".parse().unwrap();
        records.insert(acme.id, vec![older, newer]);

        let store = InMemoryMetricStore {
            companies: vec![acme],
            records,
        };
        let result = get_metric_across_portfolio(
            &store,
            Uuid::new_v4(),
            "Revenue",
            &CompanyFilters::default(),
        )
        .await
        .unwrap();

        assert_eq!(result[0].1.value, json!(2));
    }
}
