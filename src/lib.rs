//! decode-autotune library
//!
//! Tunes benchmark concurrency until the average decode time per output token
//! (TPOT) reported by an external benchmark lands in a target band.

pub mod benchmark;
pub mod config;
pub mod metrics;
pub mod optimizer;
pub mod session;
pub mod utils;
