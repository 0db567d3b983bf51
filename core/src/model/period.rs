use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// A rollup window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum Period {
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(TrackerError::Validation(format!("month must be 1-12, got {}", month)));
        }
        Ok(Period::Month { year, month })
    }

    pub fn year(year: i32) -> Self {
        Period::Year { year }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Year { year } => write!(f, "{:04}", year),
        }
    }
}
