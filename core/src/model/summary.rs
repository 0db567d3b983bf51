use serde::{Deserialize, Serialize};

use crate::model::period::Period;
use crate::model::rate::{format_rate, RateKind};

/// One ingested daily row, reduced to what the rollup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRow {
    pub employee: String,
    pub volume: i64,
    pub failures: i64,
}

impl VolumeRow {
    pub fn new(employee: impl Into<String>, volume: i64, failures: i64) -> Self {
        Self {
            employee: employee.into(),
            volume,
            failures,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub employee: String,
    pub total_volume: i64,
    pub total_failures: i64,
    pub rate: f64,
}

impl AggregateRow {
    pub fn rate_display(&self) -> String {
        format_rate(self.rate)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Summary {
    pub period: Period,
    pub rate_kind: RateKind,
    pub employees: Vec<AggregateRow>,
    pub overall: AggregateRow,
}

impl Summary {
    /// Employee rows followed by the overall row.
    pub fn rows(&self) -> impl Iterator<Item = &AggregateRow> {
        self.employees.iter().chain(std::iter::once(&self.overall))
    }
}
