//! External benchmark invocation
//!
//! - BenchmarkParams/BenchmarkCommand: argument vector and log naming
//! - BenchmarkBackend: one run into a log file
//! - ProcessRunner: child-process backend with live console mirroring

pub mod params;
pub mod runner;

pub use params::{BenchmarkCommand, BenchmarkParams, WorkloadShape};
pub use runner::{BenchmarkBackend, ProcessRunner, RunReport};
