use serde_json::Value;

/// Coerce a stored metric value into a float.
///
/// Metric values arrive as jsonb and the submission/extraction pipelines are
/// not perfectly clean: numbers, numeric strings ("1200.50", "$3,400", "12%"),
/// placeholders and stray text all occur. Anything that is not clearly a
/// number maps to `None` — absent, not zero. Callers must drop `None`s before
/// aggregating; coercing placeholders to 0 would corrupt averages and medians.
pub fn extract_numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_numeric_text(s),
        _ => None,
    }
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Tolerate light formatting dressing: "$1,200.50", "12%". Commas are
    // stripped wherever they appear, so a European-style decimal comma
    // ("1,5") reads as 15 - accepted lossiness; stored values use dot
    // decimals per the submission pipeline.
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '€' | '£'))
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_number_passes_through() {
        assert_eq!(extract_numeric_value(&json!(1200.5)), Some(1200.5));
        assert_eq!(extract_numeric_value(&json!(-42)), Some(-42.0));
        assert_eq!(extract_numeric_value(&json!(0)), Some(0.0));
    }

    #[test]
    fn test_numeric_string_parses() {
        assert_eq!(extract_numeric_value(&json!("1200.50")), Some(1200.5));
        assert_eq!(extract_numeric_value(&json!("  -3.5 ")), Some(-3.5));
    }

    #[test]
    fn test_formatted_string_parses() {
        assert_eq!(extract_numeric_value(&json!("$3,400")), Some(3400.0));
        assert_eq!(extract_numeric_value(&json!("12%")), Some(12.0));
    }

    #[test]
    fn test_commas_are_treated_as_thousands_separators() {
        // Decimal-comma input reads as grouped digits; dot decimals are
        // the canonical stored form.
        assert_eq!(extract_numeric_value(&json!("1,5")), Some(15.0));
        assert_eq!(extract_numeric_value(&json!("1,500")), Some(1500.0));
    }

    #[test]
    fn test_non_numeric_is_absent_not_zero() {
        assert_eq!(extract_numeric_value(&json!("n/a")), None);
        assert_eq!(extract_numeric_value(&json!("pending")), None);
        assert_eq!(extract_numeric_value(&json!("")), None);
        assert_eq!(extract_numeric_value(&json!(null)), None);
        assert_eq!(extract_numeric_value(&json!(true)), None);
        assert_eq!(extract_numeric_value(&json!(["1"])), None);
        assert_eq!(extract_numeric_value(&json!({"v": 1})), None);
    }

    #[test]
    fn test_non_finite_text_is_absent() {
        assert_eq!(extract_numeric_value(&json!("NaN")), None);
        assert_eq!(extract_numeric_value(&json!("inf")), None);
    }
}
