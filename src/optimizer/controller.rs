//! Concurrency controller
//!
//! A bounded linear walk over concurrency. Each round the controller sees the
//! previous measured attempt (if any) and the current one, and either proposes
//! the next concurrency or stops with a selected attempt. Reversals across the
//! target band are treated as a bracket and end the search early.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Closed latency interval `[target - tolerance, target + tolerance]` in ms
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetBand {
    target: f64,
    tolerance: f64,
}

impl TargetBand {
    pub fn new(target: f64, tolerance: f64) -> Self {
        Self {
            target,
            tolerance: tolerance.abs(),
        }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Lower edge of the band
    pub fn low(&self) -> f64 {
        self.target - self.tolerance
    }

    /// Upper edge of the band
    pub fn high(&self) -> f64 {
        self.target + self.tolerance
    }

    pub fn contains(&self, value_ms: f64) -> bool {
        (self.low()..=self.high()).contains(&value_ms)
    }

    /// Strictly above the upper edge
    pub fn is_above(&self, value_ms: f64) -> bool {
        value_ms > self.high()
    }

    /// Strictly below the lower edge
    pub fn is_below(&self, value_ms: f64) -> bool {
        value_ms < self.low()
    }
}

impl fmt::Display for TargetBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ± {} ms", self.target, self.tolerance)
    }
}

/// Fixed controller settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    pub band: TargetBand,
    /// Concurrency change per round
    pub step: u32,
}

/// A measured round
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    /// 1-based attempt number
    pub number: u32,
    pub concurrency: u32,
    /// Average decode time per output token in milliseconds
    pub decode_time_ms: f64,
    /// Log the measurement was extracted from
    pub log_path: PathBuf,
}

/// Why the search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Measurement landed inside the target band
    InBand,
    /// Measurement jumped across the band between two rounds
    Oscillation,
    /// Still too slow at concurrency 1
    Floor,
    /// Retry budget ran out; last measured attempt wins
    RetriesExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::InBand => "within target band",
            StopReason::Oscillation => "reversal across target band",
            StopReason::Floor => "concurrency floor reached",
            StopReason::RetriesExhausted => "max retries reached",
        };
        f.write_str(s)
    }
}

/// Controller output for one round
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Run another round at this concurrency
    Continue { next_concurrency: u32 },
    /// Stop and keep the selected attempt
    Stop { reason: StopReason, selected: Attempt },
}

impl Decision {
    pub fn is_stop(&self) -> bool {
        matches!(self, Decision::Stop { .. })
    }
}

/// Decides the next concurrency from (previous, current) measurements
#[derive(Debug, Clone, Copy)]
pub struct ConcurrencyController {
    config: ControllerConfig,
}

impl ConcurrencyController {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    /// Decide what to do after `curr` was measured.
    ///
    /// `prev` is the most recent earlier attempt that produced a measurement.
    /// Rules are checked in priority order; the first match wins.
    pub fn decide(&self, prev: Option<&Attempt>, curr: &Attempt) -> Decision {
        let band = &self.config.band;
        let measured = curr.decode_time_ms;

        if band.contains(measured) {
            return Decision::Stop {
                reason: StopReason::InBand,
                selected: curr.clone(),
            };
        }

        if let Some(prev) = prev {
            // Came down from above and skipped the band: current is closest on the safe side.
            if band.is_above(prev.decode_time_ms) && band.is_below(measured) {
                return Decision::Stop {
                    reason: StopReason::Oscillation,
                    selected: curr.clone(),
                };
            }

            // Went up from below and overshot: keep the last attempt under target.
            if band.is_below(prev.decode_time_ms) && band.is_above(measured) {
                return Decision::Stop {
                    reason: StopReason::Oscillation,
                    selected: prev.clone(),
                };
            }
        }

        if measured > band.target() {
            if curr.concurrency < 2 {
                return Decision::Stop {
                    reason: StopReason::Floor,
                    selected: curr.clone(),
                };
            }
            let next = curr.concurrency.saturating_sub(self.config.step).max(1);
            return Decision::Continue {
                next_concurrency: next,
            };
        }

        Decision::Continue {
            next_concurrency: curr.concurrency.saturating_add(self.config.step).max(1),
        }
    }
}
