use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::{ColumnLabels, Config};
use crate::error::{Result, TrackerError};
use crate::model::period::Period;
use crate::model::record::FormKind;
use crate::model::summary::{Summary, VolumeRow};
use crate::repository::layout::{has_sheet_extension, is_lock_file, PathLayout};
use crate::repository::sheet::{self, Cell, ColumnWidth, Table};

/// Storage seen by a rollup: the daily sheets of a period and the summary
/// it produces.
pub trait PeriodRepository {
    /// Daily sheets of `period`, in file-name order, summaries excluded.
    fn daily_files(&self, period: Period) -> Result<Vec<PathBuf>>;
    fn read_rows(&self, path: &Path) -> Result<Vec<VolumeRow>>;
    /// Overwrites the period's summary sheet and returns its path.
    fn write_summary(&self, summary: &Summary) -> Result<PathBuf>;
}

pub struct FilePeriodRepository {
    layout: PathLayout,
    labels: ColumnLabels,
    kind: FormKind,
    column_width: f64,
}

#[derive(Clone, Copy)]
enum VolumeColumns {
    Total(usize),
    Split(usize, usize),
}

impl FilePeriodRepository {
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

    fn volume_columns(&self, path: &Path, table: &Table) -> Result<VolumeColumns> {
        if let Some(total) = table.column(&self.labels.total) {
            return Ok(VolumeColumns::Total(total));
        }
        match (table.column(&self.labels.morning), table.column(&self.labels.afternoon)) {
            (Some(morning), Some(afternoon)) => Ok(VolumeColumns::Split(morning, afternoon)),
            _ => Err(TrackerError::MissingColumn {
                path: path.to_path_buf(),
                column: self.labels.total.clone(),
            }),
        }
    }
}

impl PeriodRepository for FilePeriodRepository {
    fn daily_files(&self, period: Period) -> Result<Vec<PathBuf>> {
        let dir = self.layout.scan_dir(period);
        if !dir.is_dir() {
            return Err(TrackerError::MissingDirectory(dir));
        }

        // Month: files directly in the folder. Year: files one level down,
        // inside each month folder.
        let depth = match period {
            Period::Month { .. } => 1,
            Period::Year { .. } => 2,
        };

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(depth)
            .max_depth(depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| walk_error(&dir, e))?;
            if !entry.file_type().is_file() || !has_sheet_extension(entry.path()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_lock_file(&name) {
                debug!(file = %name, "skipping editor lock file");
                continue;
            }
            if self.layout.is_summary_artifact(&name) {
                debug!(file = %name, "skipping summary sheet");
                continue;
            }
            files.push(entry.into_path());
        }
        Ok(files)
    }

    fn read_rows(&self, path: &Path) -> Result<Vec<VolumeRow>> {
        let table = sheet::read_table(path)?;
        let employee_col = table.require_column(path, &self.labels.employee)?;
        let failure_label = self.labels.failures(self.kind);
        let failure_col = table.require_column(path, failure_label)?;
        let volume_cols = self.volume_columns(path, &table)?;

        let mut rows = Vec::with_capacity(table.rows.len());
        for row in 0..table.rows.len() {
            let Some(employee) = table.cell(row, employee_col).as_text() else {
                debug!(path = %path.display(), row = row + 2, "skipping row without employee");
                continue;
            };
            let volume = match volume_cols {
                VolumeColumns::Total(col) => read_count(path, &table, row, col, &self.labels.total)?,
                VolumeColumns::Split(morning, afternoon) => {
                    read_count(path, &table, row, morning, &self.labels.morning)?
                        + read_count(path, &table, row, afternoon, &self.labels.afternoon)?
                }
            };
            let failures = read_count(path, &table, row, failure_col, failure_label)?;
            rows.push(VolumeRow::new(employee, volume, failures));
        }
        Ok(rows)
    }

    fn write_summary(&self, summary: &Summary) -> Result<PathBuf> {
        let path = self.layout.summary_file(summary.period);
        let mut table = Table::new(vec![
            self.labels.employee.clone(),
            self.labels.total.clone(),
            self.labels.failures(self.kind).to_string(),
            self.labels.rate.clone(),
        ]);
        table.rows = summary
            .rows()
            .map(|row| {
                vec![
                    Cell::text(row.employee.as_str()),
                    Cell::Number(row.total_volume as f64),
                    Cell::Number(row.total_failures as f64),
                    Cell::text(row.rate_display()),
                ]
            })
            .collect();

        sheet::write_table(&path, &table, ColumnWidth::Fixed(self.column_width))?;
        Ok(path)
    }
}

/// Whole numbers only; blank is 0. Sign is not checked here, but the
/// magnitude is held to what a daily entry can hold (`u32`).
fn read_count(path: &Path, table: &Table, row: usize, col: usize, label: &str) -> Result<i64> {
    let malformed = |reason: String| TrackerError::MalformedCell {
        path: path.to_path_buf(),
        row: row + 2,
        column: label.to_string(),
        reason,
    };
    let value = match table.cell(row, col) {
        Cell::Empty => return Ok(0),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() <= u32::MAX as f64 => *n as i64,
        Cell::Number(n) => return Err(malformed(format!("expected a whole number, got {}", n))),
        Cell::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed(format!("expected a whole number, got '{}'", s)))?,
    };
    if value.unsigned_abs() > u64::from(u32::MAX) {
        return Err(malformed(format!("count out of range: {}", value)));
    }
    Ok(value)
}

fn walk_error(root: &Path, err: walkdir::Error) -> TrackerError {
    let path = err.path().unwrap_or(root).to_path_buf();
    match err.into_io_error() {
        Some(source) => TrackerError::from_io(&path, source),
        None => TrackerError::Io {
            path,
            source: io::Error::other("filesystem loop"),
        },
    }
}
