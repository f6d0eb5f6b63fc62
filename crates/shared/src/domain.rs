use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub i64);
    };
}

id_newtype!(CandidateId);

/// One ballot-unit row. Defined at startup, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub symbol_ref: String,
}

/// Phase of the vote-casting sequence. Transitions are strictly linear;
/// the cycle restarts via `TallyShown -> Idle` when the next ballot opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceState {
    Idle,
    Locked,
    SlipEntering,
    SlipHolding,
    SlipExiting,
    Recording,
    TallyShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewName {
    Ballot,
    Slip,
    Tally,
}

/// Global status lamp on the ballot unit: green while selections are
/// accepted, red while a sequence is in flight, dark once the vote has
/// been recorded until the next ballot opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalIndicator {
    Ready,
    Busy,
    Off,
}

/// The one selection allowed in flight at any instant. Created when the
/// ballot locks, consumed when the vote reaches the tally store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingVote {
    pub candidate_id: CandidateId,
}

/// Simulated paper-trail slip shown to the voter for verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipArtifact {
    pub serial: String,
    pub candidate_name: String,
    pub symbol_ref: String,
}

impl SlipArtifact {
    pub fn for_candidate(candidate: &Candidate) -> Self {
        Self {
            serial: format!("{:02}", candidate.id.0),
            candidate_name: candidate.name.clone(),
            symbol_ref: candidate.symbol_ref.clone(),
        }
    }
}
