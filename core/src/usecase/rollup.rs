use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TrackerError};
use crate::model::period::Period;
use crate::model::rate::RateKind;
use crate::model::summary::Summary;
use crate::repository::PeriodRepository;
use crate::service::aggregate::aggregate;
use crate::service::ingest::ingest;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RollupReport {
    pub summary: Summary,
    pub output: PathBuf,
    pub files_read: usize,
}

/// Monthly and yearly summaries over the daily sheets of one form.
pub struct RollupUseCase<'a, R: PeriodRepository> {
    repo: &'a R,
    rate_kind: RateKind,
    overall_label: String,
}

impl<'a, R: PeriodRepository> RollupUseCase<'a, R> {
    pub fn new(repo: &'a R, rate_kind: RateKind, overall_label: impl Into<String>) -> Self {
        Self {
            repo,
            rate_kind,
            overall_label: overall_label.into(),
        }
    }

    /// Reads and aggregates without writing anything.
    ///
    /// A period with no daily sheets is an error rather than an empty summary.
    pub fn summarize(&self, period: Period) -> Result<(Summary, usize)> {
        let ingested = ingest(self.repo, period)?;
        if ingested.files == 0 {
            return Err(TrackerError::NoData(period));
        }
        let summary = aggregate(period, self.rate_kind, &ingested.rows, &self.overall_label)?;
        Ok((summary, ingested.files))
    }

    /// Aggregates `period` and replaces its summary artifact.
    pub fn run(&self, period: Period) -> Result<RollupReport> {
        let (summary, files_read) = self.summarize(period)?;
        let output = self.repo.write_summary(&summary)?;
        info!(
            %period,
            files = files_read,
            employees = summary.employees.len(),
            output = %output.display(),
            "wrote summary"
        );
        Ok(RollupReport {
            summary,
            output,
            files_read,
        })
    }

    pub fn monthly(&self, year: i32, month: u32) -> Result<RollupReport> {
        self.run(Period::month(year, month)?)
    }

    pub fn yearly(&self, year: i32) -> Result<RollupReport> {
        self.run(Period::year(year))
    }
}
