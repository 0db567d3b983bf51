pub mod daily_sheet;
pub mod layout;
pub mod period;
pub mod roster;
pub mod sheet;

// Re-export
pub use daily_sheet::{DailySheetRepository, FileDailySheetRepository};
pub use layout::PathLayout;
pub use period::{FilePeriodRepository, PeriodRepository};
pub use roster::FileRosterRepository;
