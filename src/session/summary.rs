//! Session summary - console block and JSON export

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::driver::SessionResult;
use crate::config::TunerConfig;
use crate::utils::Result;

/// Report of a finished tuning session
pub struct SessionSummary<'a> {
    config: &'a TunerConfig,
    result: &'a SessionResult,
}

impl<'a> SessionSummary<'a> {
    pub fn new(config: &'a TunerConfig, result: &'a SessionResult) -> Self {
        Self { config, result }
    }

    /// Measured rounds out of all executed rounds
    pub fn measured_rounds(&self) -> usize {
        self.result
            .rounds
            .iter()
            .filter(|r| r.decode_time_ms.is_some())
            .count()
    }

    /// Print the final result block
    pub fn print(&self) {
        let selected = &self.result.outcome.selected;
        println!("\n====================================");
        println!("TUNING COMPLETE");
        println!("====================================");
        println!("Target: {}", self.config.band);
        println!(
            "Rounds: {} ({} measured)",
            self.result.rounds.len(),
            self.measured_rounds()
        );
        println!("Stop reason: {}", self.result.outcome.reason);
        println!(
            "Selected: attempt {} | concurrency {} | decode time {} ms",
            selected.number, selected.concurrency, selected.decode_time_ms
        );
        println!("Final Result: {}", self.result.final_log.display());
    }

    pub fn to_json(&self) -> serde_json::Value {
        let config = self.config;
        serde_json::json!({
            "config": {
                "model_path": config.model_path,
                "target_decode_time_ms": config.band.target(),
                "tolerance_ms": config.band.tolerance(),
                "initial_concurrency": config.initial_concurrency,
                "step": config.step,
                "query_multiplier": config.query_multiplier,
                "max_retries": config.max_retries,
            },
            "rounds": self.result.rounds,
            "stop_reason": self.result.outcome.reason,
            "selected": self.result.outcome.selected,
            "final_log": self.result.final_log,
        })
    }

    /// Write the summary as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", serde_json::to_string_pretty(&self.to_json())?)?;
        Ok(())
    }
}
