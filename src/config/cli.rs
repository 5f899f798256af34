//! Command-line argument parsing
//!
//! Every flag is kebab-case; the underscore spelling used by older wrapper
//! scripts (`--model_path`, `--target_decode_time`, ...) is accepted as an alias.

use clap::Parser;
use std::path::PathBuf;

/// Auto-tune benchmark concurrency until decode time per token hits a target
#[derive(Parser, Debug, Clone)]
#[command(name = "decode-autotune")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    // ===== Session =====
    /// Model path passed through to the benchmark
    #[arg(long = "model-path", alias = "model_path")]
    pub model_path: PathBuf,

    /// Directory for attempt and final logs
    #[arg(long = "log-dir", alias = "log_dir")]
    pub log_dir: PathBuf,

    /// Initial concurrency
    #[arg(short = 'c', long = "concurrency", default_value_t = 16)]
    pub concurrency: u32,

    /// Queries issued per unit of concurrency
    #[arg(long = "query-multiplier", alias = "query_multiplier", default_value_t = 10)]
    pub query_multiplier: u32,

    /// Maximum number of measured rounds
    #[arg(long = "max-retries", alias = "max_retries", default_value_t = 10)]
    pub max_retries: u32,

    /// Target average decode time (TPOT) in milliseconds
    #[arg(long = "target-decode-time", alias = "target_decode_time", default_value_t = 50.0)]
    pub target_decode_time: f64,

    /// Accepted deviation from the target in milliseconds
    #[arg(long = "tolerance", default_value_t = 1.0)]
    pub tolerance: f64,

    /// Concurrency change applied per round
    #[arg(long = "step", default_value_t = 2)]
    pub step: u32,

    /// Pause between rounds in milliseconds
    #[arg(long = "pause-ms", alias = "pause_ms", default_value_t = 1000)]
    pub pause_ms: u64,

    /// Skip the warm-up run before the first measured attempt
    #[arg(long = "no-warmup", alias = "no_warmup")]
    pub no_warmup: bool,

    // ===== Workload Shape =====
    /// Maximum prompt length
    #[arg(long = "max-input-len", alias = "max_input_len")]
    pub max_input_len: u32,

    /// Minimum prompt length
    #[arg(long = "min-input-len", alias = "min_input_len")]
    pub min_input_len: u32,

    /// Maximum generated length
    #[arg(long = "max-output-len", alias = "max_output_len")]
    pub max_output_len: u32,

    /// Minimum generated length
    #[arg(long = "min-output-len", alias = "min_output_len")]
    pub min_output_len: u32,

    // ===== Benchmark Command =====
    /// Benchmark executable
    #[arg(long = "benchmark-bin", alias = "benchmark_bin", default_value = "./kunlun-benchmark")]
    pub benchmark_bin: PathBuf,

    /// Leading subcommand words passed before the flags
    #[arg(
        long = "benchmark-subcommand",
        alias = "benchmark_subcommand",
        default_values_t = [String::from("vllm"), String::from("server")],
        action = clap::ArgAction::Append
    )]
    pub benchmark_subcommand: Vec<String>,

    /// Serving port of the system under test
    #[arg(short = 'p', long = "port", default_value_t = 8000)]
    pub port: u16,

    /// Prompt length distribution
    #[arg(long = "prompt-type", alias = "prompt_type", default_value = "normal_distribution")]
    pub prompt_type: String,

    /// Model area
    #[arg(long = "model-area", alias = "model_area", default_value = "llm")]
    pub model_area: String,

    /// Device name reported to the benchmark
    #[arg(long = "dev-name", alias = "dev_name", default_value = "AMD308x")]
    pub dev_name: String,

    /// Benchmark work mode
    #[arg(long = "work-mode", alias = "work_mode", default_value = "manual")]
    pub work_mode: String,

    // ===== Output Options =====
    /// Write a JSON session summary to this path
    #[arg(long = "summary")]
    pub summary: Option<PathBuf>,

    /// Quiet mode (errors only, no benchmark output mirroring)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("--concurrency must be at least 1".to_string());
        }

        if self.step == 0 {
            return Err("--step must be at least 1".to_string());
        }

        if self.query_multiplier == 0 {
            return Err("--query-multiplier must be at least 1".to_string());
        }

        if self.max_retries == 0 {
            return Err("--max-retries must be at least 1".to_string());
        }

        if !self.target_decode_time.is_finite() || self.target_decode_time <= 0.0 {
            return Err("--target-decode-time must be a positive number".to_string());
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err("--tolerance must be zero or positive".to_string());
        }

        if self.min_input_len > self.max_input_len {
            return Err("--min-input-len must not exceed --max-input-len".to_string());
        }

        if self.min_output_len > self.max_output_len {
            return Err("--min-output-len must not exceed --max-output-len".to_string());
        }

        if self.quiet && self.verbose {
            return Err("--quiet and --verbose are mutually exclusive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 13] = [
        "test",
        "--model-path",
        "/models/llama",
        "--log-dir",
        "/tmp/logs",
        "--max-input-len",
        "1000",
        "--min-input-len",
        "800",
        "--max-output-len",
        "2000",
        "--min-output-len",
        "1600",
    ];

    fn parse_with(extra: &[&str]) -> CliArgs {
        let args: Vec<&str> = REQUIRED.iter().chain(extra.iter()).copied().collect();
        CliArgs::parse_from(args)
    }

    #[test]
    fn test_default_args() {
        let args = parse_with(&[]);
        assert_eq!(args.concurrency, 16);
        assert_eq!(args.query_multiplier, 10);
        assert_eq!(args.max_retries, 10);
        assert_eq!(args.target_decode_time, 50.0);
        assert_eq!(args.tolerance, 1.0);
        assert_eq!(args.step, 2);
        assert_eq!(args.port, 8000);
        assert_eq!(args.benchmark_subcommand, vec!["vllm", "server"]);
        assert!(!args.no_warmup);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_underscore_aliases() {
        let args = CliArgs::parse_from([
            "test",
            "--model_path",
            "/m",
            "--log_dir",
            "/l",
            "--max_input_len",
            "10",
            "--min_input_len",
            "5",
            "--max_output_len",
            "20",
            "--min_output_len",
            "15",
            "--target_decode_time",
            "35",
            "--query_multiplier",
            "4",
        ]);
        assert_eq!(args.model_path, PathBuf::from("/m"));
        assert_eq!(args.target_decode_time, 35.0);
        assert_eq!(args.query_multiplier, 4);
    }

    #[test]
    fn test_missing_required_fails() {
        let result = CliArgs::try_parse_from(["test", "--model-path", "/m"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let args = parse_with(&["--concurrency", "0"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_negative_tolerance() {
        let args = parse_with(&["--tolerance=-1"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_inverted_output_lengths() {
        let mut args = parse_with(&[]);
        args.min_output_len = 3000;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_inverted_input_lengths() {
        let mut args = parse_with(&[]);
        args.min_input_len = 1001;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_equal_lengths_accepted() {
        let mut args = parse_with(&[]);
        args.min_input_len = args.max_input_len;
        args.min_output_len = args.max_output_len;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_repeated_single_value_flag_rejected() {
        let argv: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .chain(["--min-output-len", "3000"])
            .collect();
        assert!(CliArgs::try_parse_from(argv).is_err());
    }
}
