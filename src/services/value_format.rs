/// Metric-aware number rendering for answer text.
///
/// Classification is by metric name alone: percentage-flavored names render
/// with a percent sign, count-flavored names as grouped integers, everything
/// else as dollars (compacted to K/M/B above a thousand).
pub fn format_metric_value(value: f64, metric_name: &str) -> String {
    let name = metric_name.to_lowercase();

    if is_percentage_metric(&name) {
        return format!("{:.1}%", value);
    }
    if is_count_metric(&name) {
        return group_thousands(value.round() as i64);
    }
    format_currency(value)
}

fn is_percentage_metric(name: &str) -> bool {
    // Burn rate is a dollar figure despite the word "rate".
    if name.contains("burn") {
        return false;
    }
    ["margin", "rate", "churn", "retention", "growth", "percent", "%"]
        .iter()
        .any(|kw| name.contains(kw))
}

fn is_count_metric(name: &str) -> bool {
    ["count", "headcount", "employees", "customers", "users", "subscribers"]
        .iter()
        .any(|kw| name.contains(kw))
}

fn format_currency(value: f64) -> String {
    let magnitude = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if magnitude >= 1_000_000_000.0 {
        format!("{}${:.1}B", sign, magnitude / 1_000_000_000.0)
    } else if magnitude >= 1_000_000.0 {
        format!("{}${:.1}M", sign, magnitude / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{}${:.1}K", sign, magnitude / 1_000.0)
    } else {
        format!("{}${:.2}", sign, magnitude)
    }
}

fn group_thousands(value: i64) -> String {
    // unsigned_abs: i64::MIN (a saturated cast upstream) has no i64 abs.
    let digits = value.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",");
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_metrics() {
        assert_eq!(format_metric_value(12.34, "Gross Margin"), "12.3%");
        assert_eq!(format_metric_value(5.0, "churn rate"), "5.0%");
    }

    #[test]
    fn test_count_metrics() {
        assert_eq!(format_metric_value(1234.0, "Headcount"), "1,234");
        assert_eq!(format_metric_value(42.4, "Active Users"), "42");
        assert_eq!(format_metric_value(1234567.0, "customer count"), "1,234,567");
    }

    #[test]
    fn test_currency_compaction() {
        assert_eq!(format_metric_value(950.0, "Revenue"), "$950.00");
        assert_eq!(format_metric_value(12_500.0, "Revenue"), "$12.5K");
        assert_eq!(format_metric_value(3_400_000.0, "ARR"), "$3.4M");
        assert_eq!(format_metric_value(2_100_000_000.0, "Valuation"), "$2.1B");
    }

    #[test]
    fn test_count_metric_survives_saturating_magnitude() {
        // -1e300 saturates to i64::MIN when rounded to an integer count;
        // grouping must not panic on its magnitude.
        let formatted = format_metric_value(-1e300, "user count");
        assert!(formatted.starts_with('-'));
        assert_eq!(formatted, "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_burn_rate_is_currency_not_percent() {
        assert_eq!(format_metric_value(85_000.0, "Burn Rate"), "$85.0K");
    }

    #[test]
    fn test_negative_currency() {
        assert_eq!(format_metric_value(-45_000.0, "Net Income"), "-$45.0K");
    }
}
