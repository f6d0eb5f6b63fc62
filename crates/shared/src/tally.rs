use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{
    de::{Deserializer, Error as _},
    ser::{SerializeMap, Serializer},
    Deserialize, Serialize,
};

use crate::{domain::CandidateId, error::MachineError};

/// Running per-candidate vote counts. An absent candidate id means a count
/// of zero, not an error. The persisted form is a flat JSON object keyed by
/// the decimal candidate id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: BTreeMap<CandidateId, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, candidate_id: CandidateId) -> u64 {
        self.counts.get(&candidate_id).copied().unwrap_or(0)
    }

    /// Adds exactly one vote for the candidate.
    pub fn increment(&mut self, candidate_id: CandidateId) {
        *self.counts.entry(candidate_id).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateId, u64)> + '_ {
        self.counts.iter().map(|(id, count)| (*id, *count))
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (id, count) in &self.counts {
            map.serialize_entry(&id.0.to_string(), count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Tally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, u64>::deserialize(deserializer)?;
        let mut counts = BTreeMap::new();
        for (key, count) in raw {
            let id = key
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid candidate id key '{key}'")))?;
            counts.insert(CandidateId(id), count);
        }
        Ok(Self { counts })
    }
}

/// Durable tally record. `record` and `clear` update durable storage before
/// returning; a persistence failure surfaces as `MachineError::Persistence`
/// while the in-memory tally keeps the intended change, so `flush` can
/// retry the write without double-counting.
#[async_trait]
pub trait TallyStore: Send + Sync {
    /// Reads the persisted record. Missing or malformed state yields an
    /// empty tally, never an error.
    async fn load(&self) -> Tally;

    /// Increments the candidate's count by exactly one and persists the
    /// full mapping atomically.
    async fn record(&self, candidate_id: CandidateId) -> Result<(), MachineError>;

    /// Re-persists the current in-memory tally. Used to retry after a
    /// failed `record` without applying the increment a second time.
    async fn flush(&self) -> Result<(), MachineError>;

    /// Resets the tally to empty and persists.
    async fn clear(&self) -> Result<(), MachineError>;

    /// Current in-memory tally, including changes not yet durable.
    async fn snapshot(&self) -> Tally;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_candidate_counts_as_zero() {
        let tally = Tally::new();
        assert_eq!(tally.count(CandidateId(3)), 0);
        assert_eq!(tally.total(), 0);
    }

    #[test]
    fn increment_touches_only_the_target_candidate() {
        let mut tally = Tally::new();
        tally.increment(CandidateId(1));
        tally.increment(CandidateId(1));
        tally.increment(CandidateId(2));
        assert_eq!(tally.count(CandidateId(1)), 2);
        assert_eq!(tally.count(CandidateId(2)), 1);
        assert_eq!(tally.count(CandidateId(3)), 0);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn persisted_form_uses_decimal_string_keys() {
        let mut tally = Tally::new();
        tally.increment(CandidateId(7));
        let json = serde_json::to_string(&tally).expect("serialize");
        assert_eq!(json, r#"{"7":1}"#);

        let parsed: Tally = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, tally);
    }

    #[test]
    fn non_numeric_key_is_rejected() {
        let result = serde_json::from_str::<Tally>(r#"{"seven":1}"#);
        assert!(result.is_err());
    }
}
