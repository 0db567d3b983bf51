pub mod aggregate;
pub mod entry_service;
pub mod ingest;

pub use aggregate::aggregate;
pub use entry_service::{
    apply_plan, plan_save, summarize_day, DaySummary, EntryService, PreparedSave, SaveIntent, SaveOutcome, SavePlan,
};
pub use ingest::{ingest, Ingested};
