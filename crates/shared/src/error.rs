use thiserror::Error;

use crate::domain::{CandidateId, SequenceState};

#[derive(Debug, Error)]
pub enum MachineError {
    /// Durable tally write failed. The in-memory tally still carries the
    /// intended change; the caller may retry the persist or continue in
    /// memory-only mode.
    #[error("tally persistence failed: {0}")]
    Persistence(String),

    /// An action arrived while the controller was not in a state that
    /// accepts it. Rejected and logged, never fatal.
    #[error("action '{action}' is not valid in state {state:?}")]
    InvalidTransition {
        state: SequenceState,
        action: &'static str,
    },

    #[error("unknown candidate id {0:?}")]
    UnknownCandidate(CandidateId),
}

impl MachineError {
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }
}
