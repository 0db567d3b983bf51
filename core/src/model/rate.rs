use serde::{Deserialize, Serialize};

/// Which percentage a form reports.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateKind {
    /// failures / total
    Misdelivery,
    /// (total - failures) / total
    Fulfillment,
}

impl RateKind {
    pub fn compute(self, total: i64, failures: i64) -> f64 {
        match self {
            RateKind::Misdelivery => misdelivery_rate(total, failures),
            RateKind::Fulfillment => fulfillment_rate(total, failures),
        }
    }
}

// Counts are not checked against each other: negative values or
// failures > total produce whatever the arithmetic gives.

pub fn misdelivery_rate(total: i64, failures: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(failures as f64 / total as f64 * 100.0)
}

pub fn fulfillment_rate(total: i64, failures: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2((total - failures) as f64 / total as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Renders a percentage the way the sheets store it, e.g. `9.09%`.
pub fn format_rate(rate: f64) -> String {
    format!("{:.2}%", rate)
}
