use chrono::{Datelike, NaiveDate};

use crate::models::PeriodType;

/// Canonical short label for a reporting period, keyed off the start date.
///
/// Quarterly periods label by the quarter the start month falls in, monthly
/// by English three-letter month, yearly (and anything unrecognized) by the
/// four-digit year alone.
pub fn format_period_label(period_start: NaiveDate, period_type: &str) -> String {
    match PeriodType::parse(period_type) {
        Some(PeriodType::Quarterly) => {
            let quarter = period_start.month0() / 3 + 1;
            format!("Q{} {}", quarter, period_start.year())
        }
        Some(PeriodType::Monthly) => period_start.format("%b %Y").to_string(),
        Some(PeriodType::Yearly) | None => period_start.year().to_string(),
    }
}
