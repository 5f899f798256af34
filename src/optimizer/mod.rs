//! Concurrency search
//!
//! This module holds the decision core of the tuner. It has no I/O: the session
//! driver feeds it measured attempts and applies its decisions.
//!
//! # Rules
//!
//! In priority order, for the current attempt `curr` and the previous measured
//! attempt `prev`:
//!
//! 1. `curr` inside `[target - tol, target + tol]`: stop, select `curr`
//! 2. `prev` above the band and `curr` below it: stop, select `curr`
//! 3. `prev` below the band and `curr` above it: stop, select `prev`
//! 4. `curr` above target at concurrency 1: stop, select `curr`
//! 5. `curr` above target: continue at `max(concurrency - step, 1)`
//! 6. otherwise: continue at `concurrency + step`
//!
//! When the retry budget runs out, the last measured attempt is selected.

mod controller;
mod search_state;

pub use controller::{
    Attempt, ConcurrencyController, ControllerConfig, Decision, StopReason, TargetBand,
};
pub use search_state::{Outcome, SearchState};
