use serde::{Deserialize, Serialize};

use crate::models::CompanyFilters;

/// The closed alphabet of structured queries the interpreter may emit.
///
/// Wire shape is `{"type": "...", "params": {...}}` with camelCase params,
/// matching what the language model is instructed to produce. Any payload
/// that does not deserialize into one of these five variants is demoted to
/// `Unknown` at the interpreter boundary; the executor never sees a tag
/// outside this set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum StructuredQuery {
    #[serde(rename_all = "camelCase")]
    MetricLookup {
        #[serde(default)]
        company_name: Option<String>,
        #[serde(default)]
        metric_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Comparison {
        #[serde(default)]
        company_names: Vec<String>,
        #[serde(default)]
        metric_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Aggregation {
        #[serde(default)]
        metric_name: Option<String>,
        #[serde(default)]
        aggregation: AggregateKind,
        #[serde(default)]
        filters: CompanyFilters,
    },
    #[serde(rename_all = "camelCase")]
    Ranking {
        #[serde(default)]
        metric_name: Option<String>,
        #[serde(default)]
        order: RankOrder,
        #[serde(default = "default_ranking_limit")]
        limit: usize,
        #[serde(default)]
        filters: CompanyFilters,
    },
    Unknown {
        #[serde(default)]
        reason: String,
    },
}

fn default_ranking_limit() -> usize {
    5
}

impl StructuredQuery {
    pub fn unknown(reason: impl Into<String>) -> Self {
        StructuredQuery::Unknown { reason: reason.into() }
    }

    /// Tag string used in `QueryResult.query_type`.
    pub fn type_name(&self) -> &'static str {
        match self {
            StructuredQuery::MetricLookup { .. } => "metric_lookup",
            StructuredQuery::Comparison { .. } => "comparison",
            StructuredQuery::Aggregation { .. } => "aggregation",
            StructuredQuery::Ranking { .. } => "ranking",
            StructuredQuery::Unknown { .. } => "unknown",
        }
    }
}

/// Statistic requested by an aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    #[default]
    Average,
    Sum,
    Median,
    Min,
    Max,
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKind::Average => write!(f, "average"),
            AggregateKind::Sum => write!(f, "total"),
            AggregateKind::Median => write!(f, "median"),
            AggregateKind::Min => write!(f, "minimum"),
            AggregateKind::Max => write!(f, "maximum"),
        }
    }
}

/// Sort direction for ranking queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    #[default]
    Top,
    Bottom,
}

/// One point of an answer's chart series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// The executor's terminal output for a single question.
///
/// `answer` is always present and displayable on its own; `data` and
/// `chart_data` are optional enrichments for tabular/chart rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query_type: String,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Vec<ChartPoint>>,
}

impl QueryResult {
    /// A result carrying only explanatory text (missing params, empty
    /// portfolio, unknown question). These are successes, not errors.
    pub fn answer_only(query_type: &str, answer: impl Into<String>) -> Self {
        Self {
            query_type: query_type.to_string(),
            answer: answer.into(),
            data: None,
            chart_data: None,
        }
    }
}

/// Request body for the ask endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioQuestion {
    pub question: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_lookup() {
        let raw = r#"{"type":"metric_lookup","params":{"companyName":"Acme","metricName":"Revenue"}}"#;
        let query: StructuredQuery = serde_json::from_str(raw).unwrap();
        assert_eq!(
            query,
            StructuredQuery::MetricLookup {
                company_name: Some("Acme".to_string()),
                metric_name: Some("Revenue".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_aggregation_defaults() {
        let raw = r#"{"type":"aggregation","params":{"metricName":"Burn Rate"}}"#;
        let query: StructuredQuery = serde_json::from_str(raw).unwrap();
        match query {
            StructuredQuery::Aggregation { metric_name, aggregation, filters } => {
                assert_eq!(metric_name.as_deref(), Some("Burn Rate"));
                assert_eq!(aggregation, AggregateKind::Average);
                assert!(filters.is_empty());
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ranking_defaults() {
        let raw = r#"{"type":"ranking","params":{"metricName":"Revenue"}}"#;
        let query: StructuredQuery = serde_json::from_str(raw).unwrap();
        match query {
            StructuredQuery::Ranking { order, limit, .. } => {
                assert_eq!(order, RankOrder::Top);
                assert_eq!(limit, 5);
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_parse_ranking_explicit_bottom() {
        let raw = r#"{"type":"ranking","params":{"metricName":"Headcount","order":"bottom","limit":3,"filters":{"industry":"SaaS"}}}"#;
        let query: StructuredQuery = serde_json::from_str(raw).unwrap();
        match query {
            StructuredQuery::Ranking { order, limit, filters, .. } => {
                assert_eq!(order, RankOrder::Bottom);
                assert_eq!(limit, 3);
                assert_eq!(filters.industry.as_deref(), Some("SaaS"));
            }
            other => panic!("unexpected query: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_tag_fails_to_parse() {
        let raw = r#"{"type":"forecast","params":{"metricName":"Revenue"}}"#;
        assert!(serde_json::from_str::<StructuredQuery>(raw).is_err());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = QueryResult {
            query_type: "comparison".to_string(),
            answer: "ok".to_string(),
            data: None,
            chart_data: Some(vec![ChartPoint { label: "Acme".to_string(), value: 1.0 }]),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["queryType"], "comparison");
        assert!(json.get("data").is_none());
        assert_eq!(json["chartData"][0]["label"], "Acme");
    }
}
