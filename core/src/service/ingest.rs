use tracing::{debug, info};

use crate::error::Result;
use crate::model::period::Period;
use crate::model::summary::VolumeRow;
use crate::repository::PeriodRepository;

/// Reads every daily sheet of `period` into one list of rows.
///
/// The first unreadable or malformed sheet aborts the whole read.
pub fn ingest<R: PeriodRepository>(repo: &R, period: Period) -> Result<Ingested> {
    let files = repo.daily_files(period)?;
    let mut rows = Vec::new();

    for file in &files {
        let mut part = repo.read_rows(file)?;
        debug!(file = %file.display(), rows = part.len(), "ingested daily sheet");
        rows.append(&mut part);
    }

    info!(%period, files = files.len(), rows = rows.len(), "ingestion finished");
    Ok(Ingested {
        files: files.len(),
        rows,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub files: usize,
    pub rows: Vec<VolumeRow>,
}
