/// Metric engine calculation rules, tested standalone.
///
/// The backend is a binary crate, so these mirror the aggregation and
/// labeling rules the query engine is built on and pin them independently of
/// the service wiring: median tie handling, strict-less-than percentiles,
/// fixed growth bands, and quarter labeling.

// ---------------------------------------------------------------------------
// Aggregation rules
// ---------------------------------------------------------------------------

#[cfg(test)]
mod aggregation_rules {
    fn median(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    fn percentile_rank(value: f64, distribution: &[f64]) -> i64 {
        if distribution.is_empty() {
            return 0;
        }
        let below = distribution.iter().filter(|&&v| v < value).count();
        ((below as f64 / distribution.len() as f64) * 100.0).round() as i64
    }

    #[test]
    fn test_median_even_is_middle_average() {
        assert_eq!(median(&[10.0, 20.0]), Some(15.0));
    }

    #[test]
    fn test_median_odd_is_middle_value() {
        assert_eq!(median(&[30.0, 10.0, 20.0]), Some(20.0));
    }

    #[test]
    fn test_median_empty_is_none() {
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_percentile_is_strictly_less_than() {
        // Tied with a duplicate maximum: 40 does not rank at 100.
        let dist = [10.0, 20.0, 40.0, 40.0];
        assert_eq!(percentile_rank(40.0, &dist), 50);
        assert_eq!(percentile_rank(50.0, &dist), 100);
        assert_eq!(percentile_rank(10.0, &dist), 0);
    }

    #[test]
    fn test_sum_excludes_absent_values_by_construction() {
        // Absent values never reach the aggregate input: a 4-company
        // portfolio where one submission is non-numeric aggregates over 3.
        let submitted = [Some(100.0), Some(200.0), None, Some(300.0)];
        let values: Vec<f64> = submitted.iter().flatten().copied().collect();
        assert_eq!(values.len(), 3);
        assert_eq!(values.iter().sum::<f64>(), 600.0);
    }
}

// ---------------------------------------------------------------------------
// Growth bucketing
// ---------------------------------------------------------------------------

#[cfg(test)]
mod growth_bands {
    fn band_index(ratio: f64) -> usize {
        if ratio < -0.20 {
            0
        } else if ratio < -0.10 {
            1
        } else if ratio < 0.0 {
            2
        } else if ratio < 0.10 {
            3
        } else if ratio < 0.20 {
            4
        } else {
            5
        }
    }

    #[test]
    fn test_reference_ratios_fill_one_band_each() {
        let ratios = [-0.25, -0.15, -0.05, 0.05, 0.15, 0.25];
        let mut counts = [0usize; 6];
        for r in ratios {
            counts[band_index(r)] += 1;
        }
        assert_eq!(counts, [1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_lower_bounds_are_inclusive() {
        assert_eq!(band_index(-0.20), 1);
        assert_eq!(band_index(-0.10), 2);
        assert_eq!(band_index(0.0), 3);
        assert_eq!(band_index(0.10), 4);
        assert_eq!(band_index(0.20), 5);
    }

    #[test]
    fn test_outer_bands_unbounded() {
        assert_eq!(band_index(-5.0), 0);
        assert_eq!(band_index(12.0), 5);
    }
}

// ---------------------------------------------------------------------------
// Period labeling
// ---------------------------------------------------------------------------

#[cfg(test)]
mod period_labels {
    use chrono::{Datelike, NaiveDate};

    fn quarter_label(start: NaiveDate) -> String {
        format!("Q{} {}", start.month0() / 3 + 1, start.year())
    }

    #[test]
    fn test_quarter_from_start_month() {
        let d = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(quarter_label(d), "Q3 2025");
        let d = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(quarter_label(d), "Q4 2025");
    }

    #[test]
    fn test_month_abbreviation_is_english() {
        let d = NaiveDate::from_ymd_opt(2025, 9, 15).unwrap();
        assert_eq!(d.format("%b %Y").to_string(), "Sep 2025");
    }
}
