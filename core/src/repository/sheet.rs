//! Whole-sheet reads and writes.
//!
//! Only the first worksheet of a workbook is used. Its first row holds the
//! column labels; columns are always looked up by label, never by position.

use std::fs::{self, File};
use std::io::{BufReader, Write};
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, XlsxError};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, TrackerError};

static EMPTY: Cell = Cell::Empty;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn number(value: impl Into<f64>) -> Self {
        Cell::Number(value.into())
    }

    /// Text content as stored, or a whole number rendered without decimals.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn display_width(&self) -> usize {
        match self {
            Cell::Text(s) => s.chars().count(),
            Cell::Number(_) => self.as_text().map(|s| s.len()).unwrap_or(0),
            Cell::Empty => 0,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            other => Cell::Text(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    Fixed(f64),
    /// Widest of header and values, in characters.
    FitContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    pub fn require_column(&self, path: &Path, label: &str) -> Result<usize> {
        self.column(label).ok_or_else(|| TrackerError::MissingColumn {
            path: path.to_path_buf(),
            column: label.to_string(),
        })
    }

    /// Short rows read back as `Empty` past their end.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }
}

pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| TrackerError::from_io(path, e))?;
    let mut workbook: Xlsx<_> =
        Xlsx::new(BufReader::new(file)).map_err(|e| TrackerError::spreadsheet(path, e))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Ok(Table::default());
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| TrackerError::spreadsheet(path, e))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| Cell::from(cell).as_text().unwrap_or_default().trim().to_string())
            .collect(),
        None => return Ok(Table::default()),
    };

    let mut table = Table::new(headers);
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(Cell::from).collect();
        if cells.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        table.rows.push(cells);
    }

    debug!(path = %path.display(), rows = table.rows.len(), "read sheet");
    Ok(table)
}

/// Replaces `path` with `table`.
///
/// The workbook is written to a temporary file beside the target and then
/// renamed over it, so the target is either fully replaced or untouched.
pub fn write_table(path: &Path, table: &Table, width: ColumnWidth) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let xlsx_err = |e: XlsxError| TrackerError::spreadsheet(path, e);

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header.as_str())
            .map_err(xlsx_err)?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let sheet_row = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(s) => {
                    worksheet
                        .write_string(sheet_row, col as u16, s.as_str())
                        .map_err(xlsx_err)?;
                }
                Cell::Number(n) => {
                    worksheet
                        .write_number(sheet_row, col as u16, *n)
                        .map_err(xlsx_err)?;
                }
                Cell::Empty => {}
            }
        }
    }

    for col in 0..table.headers.len() {
        let chars = match width {
            ColumnWidth::Fixed(chars) => chars,
            ColumnWidth::FitContent => {
                let widest = table
                    .rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(Cell::display_width)
                    .max()
                    .unwrap_or(0);
                widest.max(table.headers[col].chars().count()) as f64
            }
        };
        worksheet
            .set_column_width(col as u16, chars)
            .map_err(xlsx_err)?;
    }

    let buffer = workbook.save_to_buffer().map_err(xlsx_err)?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| TrackerError::from_io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TrackerError::from_io(dir, e))?;
    tmp.write_all(&buffer)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| TrackerError::from_io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| TrackerError::from_io(path, e.error))?;

    debug!(path = %path.display(), rows = table.rows.len(), "wrote sheet");
    Ok(())
}
