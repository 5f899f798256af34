//! Configuration module

pub mod cli;
pub mod tuner_config;

pub use cli::CliArgs;
pub use tuner_config::TunerConfig;
