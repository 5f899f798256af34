//! Tuning session orchestration

pub mod driver;
pub mod summary;

pub use driver::{RoundRecord, SessionDriver, SessionResult};
pub use summary::SessionSummary;
