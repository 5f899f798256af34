//! Search state threaded through tuning rounds

use super::controller::{Attempt, Decision, StopReason};

/// Final selection of a session
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub reason: StopReason,
    pub selected: Attempt,
}

/// Mutable state of one tuning session
///
/// Only measured attempts advance the state. A round whose report could not be
/// parsed leaves both the concurrency and `previous` untouched, so `previous`
/// is always the most recent round that produced a measurement.
#[derive(Debug, Clone)]
pub struct SearchState {
    concurrency: u32,
    attempts: u32,
    previous: Option<Attempt>,
    outcome: Option<Outcome>,
}

impl SearchState {
    pub fn new(initial_concurrency: u32) -> Self {
        Self {
            concurrency: initial_concurrency.max(1),
            attempts: 0,
            previous: None,
            outcome: None,
        }
    }

    /// Concurrency for the next round
    pub fn concurrency(&self) -> u32 {
        self.concurrency
    }

    /// Number of rounds started so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Most recent measured attempt
    pub fn previous(&self) -> Option<&Attempt> {
        self.previous.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Start a round and return its 1-based attempt number
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Apply the controller's decision for a measured attempt
    pub fn apply(&mut self, current: Attempt, decision: Decision) {
        match decision {
            Decision::Continue { next_concurrency } => {
                self.concurrency = next_concurrency.max(1);
                self.previous = Some(current);
            }
            Decision::Stop { reason, selected } => {
                self.outcome = Some(Outcome { reason, selected });
                self.previous = Some(current);
            }
        }
    }

    /// Close the session.
    ///
    /// Without a stop decision the last measured attempt is selected. Returns
    /// `None` only when no round ever produced a measurement.
    pub fn finish(self) -> Option<Outcome> {
        match self.outcome {
            Some(outcome) => Some(outcome),
            None => self.previous.map(|selected| Outcome {
                reason: StopReason::RetriesExhausted,
                selected,
            }),
        }
    }
}
