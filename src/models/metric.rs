use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single reported metric data point for one company and one period.
///
/// `value` is jsonb in the store: the extraction pipeline writes numbers, but
/// older rows and spreadsheet submissions may carry numeric-looking strings.
/// Consumers go through `services::numeric::extract_numeric_value` rather
/// than assuming a number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MetricRecord {
    pub company_id: Uuid,
    pub metric_name: String,
    pub value: serde_json::Value,
    pub period_type: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

/// Reporting cadence of a metric record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Monthly,
    Quarterly,
    Yearly,
}

impl PeriodType {
    /// Lenient parse of the stored `period_type` column. The upstream
    /// producer canonicalizes to monthly/quarterly/yearly but older rows use
    /// "annual"; anything unrecognized gets `None` and callers fall back to a
    /// year-only label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "monthly" => Some(PeriodType::Monthly),
            "quarterly" => Some(PeriodType::Quarterly),
            "yearly" | "annual" => Some(PeriodType::Yearly),
            _ => None,
        }
    }
}
