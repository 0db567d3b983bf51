use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{ColumnLabels, Config};
use crate::error::{Result, TrackerError};
use crate::model::rate::format_rate;
use crate::model::record::{Carried, DeliveryRecord, FormKind, Incidents};
use crate::repository::layout::PathLayout;
use crate::repository::sheet::{self, Cell, ColumnWidth, Table};

pub trait DailySheetRepository {
    fn kind(&self) -> FormKind;
    fn sheet_path(&self, date: NaiveDate) -> PathBuf;
    /// `None` when nothing has been saved for `date` yet.
    fn load(&self, date: NaiveDate) -> Result<Option<Vec<DeliveryRecord>>>;
    /// Replaces the whole sheet for `date`.
    fn save(&self, date: NaiveDate, records: &[DeliveryRecord]) -> Result<PathBuf>;
}

pub struct FileDailySheetRepository {
    layout: PathLayout,
    labels: ColumnLabels,
    kind: FormKind,
    column_width: f64,
}

impl FileDailySheetRepository {
    pub fn new(layout: PathLayout, labels: ColumnLabels, kind: FormKind, column_width: f64) -> Self {
        Self {
            layout,
            labels,
            kind,
            column_width,
        }
    }

    pub fn from_config(config: &Config, kind: FormKind) -> Self {
        Self::new(
            PathLayout::from_config(config, kind),
            config.labels(kind),
            kind,
            config.column_width,
        )
    }

    fn headers(&self) -> Vec<String> {
        let l = &self.labels;
        let labels: Vec<&String> = match self.kind {
            FormKind::Misdelivery => vec![&l.employee, &l.morning, &l.afternoon, &l.total, &l.misdeliveries, &l.rate],
            FormKind::Fulfillment => vec![
                &l.employee,
                &l.total,
                &l.unfulfilled,
                &l.claims,
                &l.misdeliveries,
                &l.late,
                &l.accidents,
                &l.rate,
            ],
        };
        labels.into_iter().cloned().collect()
    }

    fn to_row(&self, record: &DeliveryRecord) -> Vec<Cell> {
        let rate = Cell::text(format_rate(record.rate(self.kind.rate_kind())));
        let employee = Cell::text(record.employee.as_str());
        match (self.kind, record.carried) {
            (FormKind::Misdelivery, Carried::Split { morning, afternoon }) => vec![
                employee,
                Cell::number(morning),
                Cell::number(afternoon),
                Cell::number(record.total()),
                Cell::number(record.failures),
                rate,
            ],
            (FormKind::Misdelivery, Carried::Total(total)) => vec![
                employee,
                Cell::Empty,
                Cell::Empty,
                Cell::number(total),
                Cell::number(record.failures),
                rate,
            ],
            (FormKind::Fulfillment, _) => {
                let incidents = record.incidents.unwrap_or_default();
                vec![
                    employee,
                    Cell::number(record.total()),
                    Cell::number(record.failures),
                    Cell::number(incidents.claims),
                    Cell::number(incidents.misdeliveries),
                    Cell::number(incidents.late),
                    Cell::number(incidents.accidents),
                    rate,
                ]
            }
        }
    }

    fn parse_table(&self, path: &Path, table: &Table) -> Result<Vec<DeliveryRecord>> {
        let l = &self.labels;
        let employee_col = table.require_column(path, &l.employee)?;
        let mut records = Vec::with_capacity(table.rows.len());

        match self.kind {
            FormKind::Misdelivery => {
                let morning = table.require_column(path, &l.morning)?;
                let afternoon = table.require_column(path, &l.afternoon)?;
                let failures = table.require_column(path, &l.misdeliveries)?;
                for row in 0..table.rows.len() {
                    let Some(employee) = table.cell(row, employee_col).as_text() else {
                        continue;
                    };
                    let count = |col: usize, label: &str| read_count(path, table, row, col, label);
                    records.push(DeliveryRecord::misdelivery(
                        employee,
                        count(morning, l.morning.as_str())?,
                        count(afternoon, l.afternoon.as_str())?,
                        count(failures, l.misdeliveries.as_str())?,
                    ));
                }
            }
            FormKind::Fulfillment => {
                let total = table.require_column(path, &l.total)?;
                let unfulfilled = table.require_column(path, &l.unfulfilled)?;
                let claims = table.require_column(path, &l.claims)?;
                let misdeliveries = table.require_column(path, &l.misdeliveries)?;
                let late = table.require_column(path, &l.late)?;
                let accidents = table.require_column(path, &l.accidents)?;
                for row in 0..table.rows.len() {
                    let Some(employee) = table.cell(row, employee_col).as_text() else {
                        continue;
                    };
                    let count = |col: usize, label: &str| read_count(path, table, row, col, label);
                    let incidents = Incidents {
                        claims: count(claims, l.claims.as_str())?,
                        misdeliveries: count(misdeliveries, l.misdeliveries.as_str())?,
                        late: count(late, l.late.as_str())?,
                        accidents: count(accidents, l.accidents.as_str())?,
                    };
                    records.push(DeliveryRecord::fulfillment(
                        employee,
                        count(total, l.total.as_str())?,
                        count(unfulfilled, l.unfulfilled.as_str())?,
                        incidents,
                    ));
                }
            }
        }
        Ok(records)
    }
}

impl DailySheetRepository for FileDailySheetRepository {
    fn kind(&self) -> FormKind {
        self.kind
    }

    fn sheet_path(&self, date: NaiveDate) -> PathBuf {
        self.layout.daily_file(date)
    }

    fn load(&self, date: NaiveDate) -> Result<Option<Vec<DeliveryRecord>>> {
        let path = self.sheet_path(date);
        if !path.exists() {
            debug!(path = %path.display(), "no daily sheet");
            return Ok(None);
        }
        let table = sheet::read_table(&path)?;
        self.parse_table(&path, &table).map(Some)
    }

    fn save(&self, date: NaiveDate, records: &[DeliveryRecord]) -> Result<PathBuf> {
        let path = self.sheet_path(date);
        let mut table = Table::new(self.headers());
        table.rows = records.iter().map(|r| self.to_row(r)).collect();

        let width = match self.kind {
            FormKind::Misdelivery => ColumnWidth::Fixed(self.column_width),
            FormKind::Fulfillment => ColumnWidth::FitContent,
        };
        sheet::write_table(&path, &table, width)?;
        Ok(path)
    }
}

/// Daily counts are whole and non-negative. Blank cells read as 0.
fn read_count(path: &Path, table: &Table, row: usize, col: usize, label: &str) -> Result<u32> {
    let malformed = |reason: String| TrackerError::MalformedCell {
        path: path.to_path_buf(),
        row: row + 2,
        column: label.to_string(),
        reason,
    };
    match table.cell(row, col) {
        Cell::Empty => Ok(0),
        Cell::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u32::MAX as f64 => Ok(*n as u32),
        Cell::Number(n) => Err(malformed(format!("expected a whole count, got {}", n))),
        Cell::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| malformed(format!("expected a whole count, got '{}'", s))),
    }
}
