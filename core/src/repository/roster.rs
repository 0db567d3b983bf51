use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Result, TrackerError};
use crate::model::roster::Roster;

#[derive(Clone)]
pub struct FileRosterRepository {
    file_path: PathBuf,
}

impl FileRosterRepository {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    pub fn load(&self) -> Result<Roster> {
        let content = fs::read_to_string(&self.file_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TrackerError::MissingRoster(self.file_path.clone()),
            _ => TrackerError::from_io(&self.file_path, e),
        })?;
        let roster = Roster::from_text(&content);
        debug!(path = %self.file_path.display(), employees = roster.names().len(), "loaded roster");
        Ok(roster)
    }
}
