pub mod rollup;
mod rollup_test;

pub use rollup::{RollupReport, RollupUseCase};
