use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::models::StructuredQuery;
use crate::services::llm_service::LlmService;

/// Fixed instruction block sent with every question. Enumerates the closed
/// set of query shapes, their parameter schemas and worked examples, and
/// demands a bare JSON object back.
const INTERPRETER_INSTRUCTIONS: &str = r#"You translate portfolio questions from investors into structured queries. Respond with a single JSON object and nothing else - no prose, no code fences.

The object has the shape {"type": "...", "params": {...}}. The only valid types are:

1. "metric_lookup" - one company's latest value for one metric.
   params: {"companyName": string, "metricName": string}
   Example: "What is Acme's revenue?" ->
   {"type":"metric_lookup","params":{"companyName":"Acme","metricName":"Revenue"}}

2. "comparison" - compare two or more named companies on one metric.
   params: {"companyNames": [string, ...], "metricName": string}
   Example: "Compare burn rate for Acme and Globex" ->
   {"type":"comparison","params":{"companyNames":["Acme","Globex"],"metricName":"Burn Rate"}}

3. "aggregation" - one statistic over the whole portfolio.
   params: {"metricName": string, "aggregation": "average"|"sum"|"median"|"min"|"max", "filters": {"industry": string?, "stage": string?}}
   "aggregation" defaults to "average"; omit "filters" unless the question names an industry or stage.
   Example: "What's the average burn rate for my fintech companies?" ->
   {"type":"aggregation","params":{"metricName":"Burn Rate","aggregation":"average","filters":{"industry":"Fintech"}}}

4. "ranking" - top or bottom N companies by one metric.
   params: {"metricName": string, "order": "top"|"bottom", "limit": number, "filters": {...}}
   "order" defaults to "top" and "limit" to 5.
   Example: "Top 3 companies by revenue" ->
   {"type":"ranking","params":{"metricName":"Revenue","order":"top","limit":3}}

If the question does not fit any shape, respond with:
{"type":"unknown","params":{"reason": "one short sentence saying what was unclear"}}

Use the metric name the user said, title-cased. Never invent company names or metrics."#;

/// Canned follow-up suggestions shown whenever a question could not be
/// understood.
pub const EXAMPLE_QUESTIONS: &str = "Try questions like: \"What is Acme's revenue?\", \
\"Compare burn rate for Acme and Globex\", \"What's the average MRR across my portfolio?\", \
or \"Top 5 companies by revenue\".";

const GENERIC_UNKNOWN_REASON: &str = "I couldn't understand that question.";

/// Boundary around the external language model.
///
/// `parse_query` never fails: disabled provider, network error, timeout,
/// rate-limit exhaustion, unparseable output and out-of-alphabet tags all
/// collapse into `StructuredQuery::Unknown`, so a flaky dependency degrades
/// to a polite "didn't understand" instead of a hard failure.
pub struct QueryInterpreter {
    llm: Arc<LlmService>,
}

impl QueryInterpreter {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self { llm }
    }

    pub async fn parse_query(&self, investor_id: Uuid, raw_question: &str) -> StructuredQuery {
        let response = match self
            .llm
            .complete_for_investor(investor_id, INTERPRETER_INSTRUCTIONS, raw_question)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Interpreter call failed, demoting to unknown: {}", e);
                return StructuredQuery::unknown(GENERIC_UNKNOWN_REASON);
            }
        };

        match parse_structured_response(&response) {
            Ok(query) => {
                info!("Interpreted question as {} query", query.type_name());
                query
            }
            Err(e) => {
                warn!("Unparseable interpreter output, demoting to unknown: {}", e);
                StructuredQuery::unknown(GENERIC_UNKNOWN_REASON)
            }
        }
    }
}

/// Parse the model's raw text into a structured query. Tolerates markdown
/// code fences, nothing else; no partial recovery of malformed payloads.
pub fn parse_structured_response(raw: &str) -> Result<StructuredQuery, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw))
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
