//! Error types for decode-autotune

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level tuner error
///
/// Only launch failures and I/O on the session's own directories abort a
/// session. A round whose report has no decode-time line is not an error; the
/// driver skips it and retries at the same concurrency.
#[derive(Error, Debug)]
pub enum TunerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to launch benchmark '{program}': {source}")]
    Launch { program: String, source: io::Error },

    #[error("Failed to write attempt log {path}: {source}")]
    LogSink { path: PathBuf, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No attempt produced a decode time measurement after {attempts} attempt(s)")]
    NoMeasurement { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, TunerError>;
