use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::model::rate::RateKind;

/// The two daily forms. Each has its own sheet layout and rate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Misdelivery,
    Fulfillment,
}

impl FormKind {
    pub fn rate_kind(self) -> RateKind {
        match self {
            FormKind::Misdelivery => RateKind::Misdelivery,
            FormKind::Fulfillment => RateKind::Fulfillment,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Misdelivery => "misdelivery",
            FormKind::Fulfillment => "fulfillment",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "misdelivery" | "mis" | "m" => Ok(FormKind::Misdelivery),
            "fulfillment" | "ful" | "f" => Ok(FormKind::Fulfillment),
            other => Err(TrackerError::Validation(format!(
                "unknown form '{}' (expected misdelivery or fulfillment)",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carried {
    Split { morning: u32, afternoon: u32 },
    Total(u32),
}

impl Carried {
    pub fn total(&self) -> u32 {
        match *self {
            Carried::Split { morning, afternoon } => morning.saturating_add(afternoon),
            Carried::Total(total) => total,
        }
    }
}

/// Extra counters kept by the fulfillment form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Incidents {
    pub claims: u32,
    pub misdeliveries: u32,
    pub late: u32,
    pub accidents: u32,
}

/// One employee's entry for one day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub employee: String,
    pub carried: Carried,
    pub failures: u32,
    pub incidents: Option<Incidents>,
}

impl DeliveryRecord {
    pub fn misdelivery(employee: impl Into<String>, morning: u32, afternoon: u32, misdeliveries: u32) -> Self {
        Self {
            employee: employee.into(),
            carried: Carried::Split { morning, afternoon },
            failures: misdeliveries,
            incidents: None,
        }
    }

    pub fn fulfillment(employee: impl Into<String>, total: u32, unfulfilled: u32, incidents: Incidents) -> Self {
        Self {
            employee: employee.into(),
            carried: Carried::Total(total),
            failures: unfulfilled,
            incidents: Some(incidents),
        }
    }

    pub fn total(&self) -> u32 {
        self.carried.total()
    }

    pub fn rate(&self, kind: RateKind) -> f64 {
        kind.compute(self.total() as i64, self.failures as i64)
    }
}
