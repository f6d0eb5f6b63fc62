use std::collections::HashSet;

use anyhow::{bail, Result};
use shared::domain::{Candidate, CandidateId};

/// Ordered, read-only candidate catalog supplied at startup.
#[derive(Debug, Clone)]
pub struct CandidateRegistry {
    candidates: Vec<Candidate>,
}

impl CandidateRegistry {
    /// Builds a registry, rejecting nonpositive or duplicate candidate ids.
    pub fn new(candidates: Vec<Candidate>) -> Result<Self> {
        let mut seen = HashSet::new();
        for candidate in &candidates {
            if candidate.id.0 <= 0 {
                bail!("candidate id must be positive, got {}", candidate.id.0);
            }
            if !seen.insert(candidate.id) {
                bail!("duplicate candidate id {}", candidate.id.0);
            }
        }
        Ok(Self { candidates })
    }

    /// The stock eight-row ballot used when no catalog is configured.
    pub fn default_catalog() -> Self {
        const NAMES: [&str; 8] = [
            "Candidate One",
            "Candidate Two",
            "Candidate Three",
            "Candidate Four",
            "Candidate Five",
            "Candidate Six",
            "Candidate Seven",
            "Candidate Eight",
        ];
        let candidates = NAMES
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let id = idx as i64 + 1;
                Candidate {
                    id: CandidateId(id),
                    name: (*name).to_string(),
                    symbol_ref: format!("assets/logos/candidate-{id}.png"),
                }
            })
            .collect();
        Self { candidates }
    }

    pub fn get(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: i64, name: &str) -> Candidate {
        Candidate {
            id: CandidateId(id),
            name: name.to_string(),
            symbol_ref: format!("assets/logos/candidate-{id}.png"),
        }
    }

    #[test]
    fn preserves_supplied_order() {
        let registry = CandidateRegistry::new(vec![
            candidate(3, "C"),
            candidate(1, "A"),
            candidate(2, "B"),
        ])
        .expect("registry");
        let ids: Vec<i64> = registry.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = CandidateRegistry::new(vec![candidate(1, "A"), candidate(1, "B")]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_nonpositive_ids() {
        assert!(CandidateRegistry::new(vec![candidate(0, "A")]).is_err());
        assert!(CandidateRegistry::new(vec![candidate(-4, "B")]).is_err());
    }

    #[test]
    fn looks_up_by_id() {
        let registry = CandidateRegistry::default_catalog();
        assert_eq!(registry.len(), 8);
        let second = registry.get(CandidateId(2)).expect("candidate 2");
        assert_eq!(second.name, "Candidate Two");
        assert!(registry.get(CandidateId(99)).is_none());
    }
}
