use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::period::Period;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// The file is locked by another program or we lack permission.
    #[error("cannot access {}: check that it is not open in a spreadsheet editor", .path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("no daily sheets found for {0}")]
    NoData(Period),

    #[error("totals for '{0}' are too large to add up")]
    CountOverflow(String),

    #[error("employee roster not found: {}", .0.display())]
    MissingRoster(PathBuf),

    #[error("{}: missing column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}: row {row}, column '{column}': {reason}", .path.display())]
    MalformedCell {
        path: PathBuf,
        row: usize,
        column: String,
        reason: String,
    },

    /// Entry input rejected before anything is written.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("a sheet already exists for {date}; choose --mode append or --mode modify")]
    NeedsChoice { date: NaiveDate },

    #[error("no row for employee '{employee}' on {date}")]
    UnknownEmployee { employee: String, date: NaiveDate },

    #[error("no sheet recorded for {0}")]
    NoSheet(NaiveDate),

    #[error("spreadsheet error in {}: {message}", .path.display())]
    Spreadsheet { path: PathBuf, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TrackerError {
    /// Classifies an I/O failure on `path`, separating lock and permission
    /// problems from everything else.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if is_access_denied(&source) {
            TrackerError::Access {
                path: path.to_path_buf(),
                source,
            }
        } else {
            TrackerError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn spreadsheet<E: std::fmt::Display>(path: &Path, err: E) -> Self {
        TrackerError::Spreadsheet {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

fn is_access_denied(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::PermissionDenied {
        return true;
    }
    // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
    cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33))
}
