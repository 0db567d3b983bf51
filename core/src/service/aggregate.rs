use std::collections::BTreeMap;

use crate::error::{Result, TrackerError};
use crate::model::period::Period;
use crate::model::rate::RateKind;
use crate::model::summary::{AggregateRow, Summary, VolumeRow};

/// Groups `rows` by employee and sums them.
///
/// Employees are matched on the exact string and come out in sorted order,
/// so the result does not depend on the order rows were read in. The overall
/// rate is taken from the grand totals, not averaged over employees.
/// Sums that do not fit in an `i64` are reported, never wrapped.
pub fn aggregate(period: Period, rate_kind: RateKind, rows: &[VolumeRow], overall_label: &str) -> Result<Summary> {
    let mut groups: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = groups.entry(row.employee.as_str()).or_insert((0, 0));
        *entry = add_counts(*entry, (row.volume, row.failures))
            .ok_or_else(|| TrackerError::CountOverflow(row.employee.clone()))?;
    }

    let employees: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(employee, (volume, failures))| AggregateRow {
            employee: employee.to_string(),
            total_volume: volume,
            total_failures: failures,
            rate: rate_kind.compute(volume, failures),
        })
        .collect();

    let (total_volume, total_failures) = employees
        .iter()
        .try_fold((0i64, 0i64), |acc, e| add_counts(acc, (e.total_volume, e.total_failures)))
        .ok_or_else(|| TrackerError::CountOverflow(overall_label.to_string()))?;
    let overall = AggregateRow {
        employee: overall_label.to_string(),
        total_volume,
        total_failures,
        rate: rate_kind.compute(total_volume, total_failures),
    };

    Ok(Summary {
        period,
        rate_kind,
        employees,
        overall,
    })
}

fn add_counts(a: (i64, i64), b: (i64, i64)) -> Option<(i64, i64)> {
    Some((a.0.checked_add(b.0)?, a.1.checked_add(b.1)?))
}
