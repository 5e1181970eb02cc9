use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::stats::{AggregateSummary, GrowthBucket, GrowthClass};

/// One company's position within a portfolio metric distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyBenchmark {
    pub company_id: Uuid,
    pub company_name: String,
    pub value: f64,
    pub formatted_value: String,
    pub period: String,
    /// Percent of portfolio values strictly below this company's value.
    pub percentile: i64,
}

/// Portfolio-wide benchmark view for a single metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricBenchmarkResponse {
    pub metric_name: String,
    pub companies: Vec<CompanyBenchmark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AggregateSummary>,
}

/// Period-over-period growth for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyGrowth {
    pub company_id: Uuid,
    pub company_name: String,
    /// Growth as a ratio, e.g. 0.12 for +12% period over period.
    pub growth: f64,
    pub classification: GrowthClass,
}

/// Growth-rate distribution across the portfolio for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthDistributionResponse {
    pub metric_name: String,
    pub mean_growth: Option<f64>,
    /// All six fixed bands, zero-counted where empty.
    pub buckets: Vec<GrowthBucket>,
    pub companies: Vec<CompanyGrowth>,
}
