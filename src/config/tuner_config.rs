//! Tuning session configuration derived from CLI arguments

use super::cli::CliArgs;
use crate::benchmark::{BenchmarkCommand, WorkloadShape};
use crate::optimizer::{ControllerConfig, TargetBand};
use std::path::PathBuf;
use std::time::Duration;

/// Complete tuning session configuration
#[derive(Debug, Clone)]
pub struct TunerConfig {
    // Session
    pub model_path: PathBuf,
    pub log_dir: PathBuf,
    pub initial_concurrency: u32,
    pub max_retries: u32,
    pub pause: Duration,
    pub warmup: bool,

    // Search
    pub band: TargetBand,
    pub step: u32,

    // Workload
    pub query_multiplier: u32,
    pub workload: WorkloadShape,
    pub command: BenchmarkCommand,

    // Output
    pub summary_path: Option<PathBuf>,
    pub quiet: bool,
}

impl TunerConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        args.validate()?;

        Ok(Self {
            model_path: args.model_path.clone(),
            log_dir: args.log_dir.clone(),
            initial_concurrency: args.concurrency,
            max_retries: args.max_retries,
            pause: Duration::from_millis(args.pause_ms),
            warmup: !args.no_warmup,
            band: TargetBand::new(args.target_decode_time, args.tolerance),
            step: args.step,
            query_multiplier: args.query_multiplier,
            workload: WorkloadShape {
                max_input_len: args.max_input_len,
                min_input_len: args.min_input_len,
                max_output_len: args.max_output_len,
                min_output_len: args.min_output_len,
            },
            command: BenchmarkCommand {
                program: args.benchmark_bin.clone(),
                subcommand: args.benchmark_subcommand.clone(),
                port: args.port,
                prompt_type: args.prompt_type.clone(),
                model_area: args.model_area.clone(),
                dev_name: args.dev_name.clone(),
                work_mode: args.work_mode.clone(),
            },
            summary_path: args.summary.clone(),
            quiet: args.quiet,
        })
    }

    /// Controller settings for this session
    pub fn controller(&self) -> ControllerConfig {
        ControllerConfig {
            band: self.band,
            step: self.step,
        }
    }

    /// Directory holding one log per attempt
    pub fn attempts_dir(&self) -> PathBuf {
        self.log_dir.join("attempts")
    }

    /// Directory holding the selected attempt's log
    pub fn final_dir(&self) -> PathBuf {
        self.log_dir.join("final")
    }
}
