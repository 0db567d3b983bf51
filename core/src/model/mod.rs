pub mod form;
pub mod period;
pub mod rate;
pub mod record;
pub mod roster;
pub mod summary;
