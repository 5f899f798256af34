//! Benchmark invocation parameters
//!
//! Builds the argument vector for the external workload generator and the
//! descriptive names used for attempt logs.

use std::ffi::OsString;
use std::path::PathBuf;

/// Prompt and generation length bounds, fixed for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadShape {
    pub max_input_len: u32,
    pub min_input_len: u32,
    pub max_output_len: u32,
    pub min_output_len: u32,
}

/// How to invoke the benchmark executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkCommand {
    pub program: PathBuf,
    /// Words placed before any flag (e.g. `vllm server`)
    pub subcommand: Vec<String>,
    pub port: u16,
    pub prompt_type: String,
    pub model_area: String,
    pub dev_name: String,
    pub work_mode: String,
}

impl Default for BenchmarkCommand {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./kunlun-benchmark"),
            subcommand: vec!["vllm".to_string(), "server".to_string()],
            port: 8000,
            prompt_type: "normal_distribution".to_string(),
            model_area: "llm".to_string(),
            dev_name: "AMD308x".to_string(),
            work_mode: "manual".to_string(),
        }
    }
}

impl BenchmarkCommand {
    /// Full argument vector (program excluded) for one run
    pub fn to_args(&self, params: &BenchmarkParams) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.subcommand.iter().map(OsString::from).collect();

        let fixed = [
            ("--port", self.port.to_string()),
            ("--prompt_type", self.prompt_type.clone()),
            ("--model_area", self.model_area.clone()),
            ("--dev_name", self.dev_name.clone()),
            ("--work_mode", self.work_mode.clone()),
        ];
        for (flag, value) in fixed {
            args.push(flag.into());
            args.push(value.into());
        }

        args.push("--model_path".into());
        args.push(params.model_path.clone().into_os_string());

        for (flag, value) in params.variable_flags() {
            args.push(flag.into());
            args.push(value.into());
        }
        args
    }

    /// Shell-like rendering for logs
    pub fn render(&self, params: &BenchmarkParams) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(
            self.to_args(params)
                .iter()
                .map(|a| a.to_string_lossy().into_owned()),
        );
        parts.join(" ")
    }
}

/// Per-round benchmark parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkParams {
    pub model_path: PathBuf,
    pub concurrency: u32,
    /// Total queries issued by the run
    pub query_num: u64,
    pub workload: WorkloadShape,
}

impl BenchmarkParams {
    /// Parameters for `concurrency`; query volume is `concurrency * query_multiplier`
    pub fn new(
        model_path: PathBuf,
        concurrency: u32,
        query_multiplier: u32,
        workload: WorkloadShape,
    ) -> Self {
        Self {
            model_path,
            concurrency,
            query_num: u64::from(concurrency) * u64::from(query_multiplier),
            workload,
        }
    }

    fn variable_flags(&self) -> [(&'static str, String); 6] {
        [
            ("--max_input_len", self.workload.max_input_len.to_string()),
            ("--min_input_len", self.workload.min_input_len.to_string()),
            ("--max_output_len", self.workload.max_output_len.to_string()),
            ("--min_output_len", self.workload.min_output_len.to_string()),
            ("--query_num", self.query_num.to_string()),
            ("--concurrency", self.concurrency.to_string()),
        ]
    }

    /// Name derived from the variable flags, e.g.
    /// `max_input_len_1000_..._query_num_160_concurrency_16`
    pub fn descriptive_name(&self) -> String {
        self.variable_flags()
            .iter()
            .map(|(flag, value)| format!("{}_{}", flag.trim_start_matches('-'), value))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn attempt_log_name(&self, attempt: u32) -> String {
        format!("{}_attempt_{}.log", self.descriptive_name(), attempt)
    }

    pub fn warmup_log_name(&self, attempt: u32) -> String {
        format!("{}_attempt_{}_warmup.log", self.descriptive_name(), attempt)
    }

    pub fn final_log_name(&self) -> String {
        format!("{}.log", self.descriptive_name())
    }
}
