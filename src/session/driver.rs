//! Tuning session driver
//!
//! Runs the attempt loop: warm up once, run the benchmark, extract the decode
//! time, ask the controller, apply its decision. Rounds are strictly
//! sequential. The selected attempt's log is copied to `<log_dir>/final/`.

use std::fs;
use std::path::PathBuf;
use std::thread;

use serde::Serialize;
use tracing::{info, warn};

use crate::benchmark::{BenchmarkBackend, BenchmarkParams};
use crate::config::TunerConfig;
use crate::metrics::read_decode_time;
use crate::optimizer::{Attempt, ConcurrencyController, Decision, Outcome, SearchState, StopReason};
use crate::utils::{Result, TunerError};

/// One executed round, measured or not
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundRecord {
    pub number: u32,
    pub concurrency: u32,
    pub query_num: u64,
    pub log_path: PathBuf,
    /// `None` when the report had no decode-time line
    pub decode_time_ms: Option<f64>,
    /// Benchmark exit code; `None` if it was killed by a signal
    pub exit_code: Option<i32>,
    pub elapsed_secs: f64,
}

/// Result of a completed session
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub outcome: Outcome,
    /// Copy of the selected attempt's log
    pub final_log: PathBuf,
    pub rounds: Vec<RoundRecord>,
}

/// Drives a tuning session against a benchmark backend
pub struct SessionDriver<B: BenchmarkBackend> {
    config: TunerConfig,
    backend: B,
    controller: ConcurrencyController,
}

impl<B: BenchmarkBackend> SessionDriver<B> {
    pub fn new(config: TunerConfig, backend: B) -> Self {
        let controller = ConcurrencyController::new(config.controller());
        Self {
            config,
            backend,
            controller,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn params(&self, concurrency: u32) -> BenchmarkParams {
        BenchmarkParams::new(
            self.config.model_path.clone(),
            concurrency,
            self.config.query_multiplier,
            self.config.workload,
        )
    }

    fn prepare_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.config.log_dir)?;
        fs::create_dir_all(self.config.attempts_dir())?;
        fs::create_dir_all(self.config.final_dir())?;
        Ok(())
    }

    /// Run the session to completion.
    ///
    /// Fails when the benchmark cannot be launched, when the log directories
    /// cannot be written, or when no round ever produced a measurement.
    pub fn run(&mut self) -> Result<SessionResult> {
        self.prepare_dirs()?;

        let max_retries = self.config.max_retries;
        let attempts_dir = self.config.attempts_dir();
        let mut state = SearchState::new(self.config.initial_concurrency);
        let mut rounds = Vec::new();

        while state.attempts() < max_retries && !state.is_finished() {
            let number = state.begin_attempt();
            let params = self.params(state.concurrency());
            info!("Attempt {}/{}", number, max_retries);

            if self.config.warmup && number == 1 {
                let warmup_log = attempts_dir.join(params.warmup_log_name(number));
                info!("Warm-up run (output not measured)");
                self.backend.run(&params, &warmup_log)?;
            }

            let log_path = attempts_dir.join(params.attempt_log_name(number));
            let report = self.backend.run(&params, &log_path)?;

            let decode_time_ms = read_decode_time(&log_path);
            rounds.push(RoundRecord {
                number,
                concurrency: params.concurrency,
                query_num: params.query_num,
                log_path: log_path.clone(),
                decode_time_ms,
                exit_code: report.exit_code,
                elapsed_secs: report.elapsed.as_secs_f64(),
            });

            let Some(decode_time_ms) = decode_time_ms else {
                warn!("Skipping attempt {}: no decode time in log", number);
                continue;
            };

            info!(
                "Current Decode Time: {} ms (Target: {})",
                decode_time_ms, self.config.band
            );

            let attempt = Attempt {
                number,
                concurrency: params.concurrency,
                decode_time_ms,
                log_path,
            };
            let decision = self.controller.decide(state.previous(), &attempt);
            self.log_decision(state.previous(), &attempt, &decision);

            let keep_going = !decision.is_stop();
            state.apply(attempt, decision);

            if keep_going && state.attempts() < max_retries && !self.config.pause.is_zero() {
                thread::sleep(self.config.pause);
            }
        }

        if !state.is_finished() {
            warn!(
                "Reached max retries ({}). Final concurrency = {}",
                max_retries,
                state.concurrency()
            );
        }

        let attempts = state.attempts();
        let outcome = state
            .finish()
            .ok_or(TunerError::NoMeasurement { attempts })?;

        let final_log = self
            .config
            .final_dir()
            .join(self.params(outcome.selected.concurrency).final_log_name());
        fs::copy(&outcome.selected.log_path, &final_log)?;
        info!("Final Result: {}", final_log.display());

        Ok(SessionResult {
            outcome,
            final_log,
            rounds,
        })
    }

    fn log_decision(&self, prev: Option<&Attempt>, curr: &Attempt, decision: &Decision) {
        let band = &self.config.band;
        let measured = curr.decode_time_ms;
        match decision {
            Decision::Stop {
                reason: StopReason::InBand,
                ..
            } => info!(
                "Success! Optimal concurrency = {} (Decode Time = {} ms)",
                curr.concurrency, measured
            ),
            Decision::Stop {
                reason: StopReason::Oscillation,
                selected,
            } => {
                let last = prev.map(|p| p.decode_time_ms).unwrap_or_default();
                if band.is_above(last) {
                    info!(
                        "Stopping: last decode time was too high ({} > {}), now too low ({} < {})",
                        last,
                        band.high(),
                        measured,
                        band.low()
                    );
                } else {
                    info!(
                        "Stopping: last decode time was too low ({} < {}), now too high ({} > {})",
                        last,
                        band.low(),
                        measured,
                        band.high()
                    );
                }
                info!(
                    "Selected attempt {} (concurrency = {})",
                    selected.number, selected.concurrency
                );
            }
            Decision::Stop {
                reason: StopReason::Floor,
                ..
            } => info!(
                "Decode time too high ({} > {}) at concurrency {}; cannot go lower",
                measured,
                band.target(),
                curr.concurrency
            ),
            Decision::Stop {
                reason: StopReason::RetriesExhausted,
                ..
            } => {}
            Decision::Continue { next_concurrency } if measured > band.target() => info!(
                "Decode time too high ({} > {}). Decreasing concurrency to {}",
                measured,
                band.target(),
                next_concurrency
            ),
            Decision::Continue { next_concurrency } => info!(
                "Decode time too low ({} < {}). Increasing concurrency to {}",
                measured,
                band.target(),
                next_concurrency
            ),
        }
    }
}
