use serde::{Deserialize, Serialize};

/// Summary statistics over a filtered numeric sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AggregateSummary {
    pub sum: f64,
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Compute sum/average/median/min/max over a sample.
///
/// Returns `None` for an empty slice; callers are expected to have filtered
/// out absent values already and to guard the empty case with their own
/// "no data" path. `sum` is only meaningful for additive metrics, which is
/// the caller's judgment to make.
pub fn aggregate(values: &[f64]) -> Option<AggregateSummary> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().sum();
    let (min, max) = values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    Some(AggregateSummary {
        sum,
        average: sum / values.len() as f64,
        median: median(values)?,
        min,
        max,
        count: values.len(),
    })
}

/// Median without mutating the input: middle value for odd length, mean of
/// the two middle values for even length.
pub fn median(values: &[f64]) -> Option<f64> {
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

/// Percentile rank of `value` within `distribution`: the fraction of values
/// strictly less than `value`, scaled to 0-100 and rounded.
///
/// Strict-less-than is deliberate: a value tied with duplicate maxima does
/// not rank at 100. Empty distribution ranks at 0.
pub fn percentile_rank(value: f64, distribution: &[f64]) -> i64 {
    if distribution.is_empty() {
        return 0;
    }
    let below = distribution.iter().filter(|&&v| v < value).count();
    ((below as f64 / distribution.len() as f64) * 100.0).round() as i64
}

/// One band of the fixed growth-rate histogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthBucket {
    pub label: String,
    pub count: usize,
}

const GROWTH_BAND_LABELS: [&str; 6] = [
    "<-20%",
    "-20% to -10%",
    "-10% to 0%",
    "0% to 10%",
    "10% to 20%",
    ">20%",
];

/// Histogram of period-over-period growth ratios across six fixed bands.
///
/// Interior bands are inclusive on their lower bound and exclusive on the
/// upper; the outermost bands are unbounded. All six bands are always present
/// (count 0 where empty) so charting never special-cases missing buckets.
pub fn growth_buckets(ratios: &[f64]) -> Vec<GrowthBucket> {
    let mut counts = [0usize; 6];
    for &ratio in ratios {
        let idx = if ratio < -0.20 {
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
        };
        counts[idx] += 1;
    }
    GROWTH_BAND_LABELS
        .iter()
        .zip(counts)
        .map(|(&label, count)| GrowthBucket { label: label.to_string(), count })
        .collect()
}

/// Distance from the portfolio mean growth beyond which a company counts as
/// an outlier, in growth points (0.15 == 15 points). A flat mean-distance
/// rule, not a z-score.
pub const OUTLIER_THRESHOLD: f64 = 0.15;

/// Performance classification relative to portfolio mean growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthClass {
    Outperforming,
    InLine,
    Underperforming,
}

pub fn classify_growth(growth: f64, portfolio_mean: f64) -> GrowthClass {
    if growth > portfolio_mean + OUTLIER_THRESHOLD {
        GrowthClass::Outperforming
    } else if growth < portfolio_mean - OUTLIER_THRESHOLD {
        GrowthClass::Underperforming
    } else {
        GrowthClass::InLine
    }
}
