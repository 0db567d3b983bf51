pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;
pub mod usecase;

pub use config::{ColumnLabels, Config, FormSettings, LabelOverrides};
pub use error::{Result, TrackerError};
pub use input::{expand_key, parse_row, ParsedRow};
pub use model::form::{EntryForm, Field};
pub use model::period::Period;
pub use model::rate::{format_rate, RateKind};
pub use model::record::{Carried, DeliveryRecord, FormKind, Incidents};
pub use model::roster::Roster;
pub use model::summary::{AggregateRow, Summary};
pub use repository::{
    DailySheetRepository, FileDailySheetRepository, FilePeriodRepository, FileRosterRepository, PeriodRepository,
};
pub use service::entry_service::{DaySummary, EntryService, PreparedSave, SaveIntent, SaveOutcome, SavePlan};
pub use time::parse_entry_date;
pub use usecase::rollup::{RollupReport, RollupUseCase};
