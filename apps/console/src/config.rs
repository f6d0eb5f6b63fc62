use std::{fs, path::Path, time::Duration};

use machine_core::{CandidateRegistry, Timings};
use serde::Deserialize;
use shared::domain::{Candidate, CandidateId};
use tracing::warn;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tally_path: String,
    pub lock_delay_ms: u64,
    pub slip_enter_ms: u64,
    pub slip_hold_ms: u64,
    pub slip_exit_ms: u64,
    pub beep_frequency_hz: u32,
    pub beep_duration_ms: u64,
    /// Ballot rows, in display order. Empty means the stock catalog.
    pub candidates: Vec<CandidateEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tally_path: "./data/tally.json".into(),
            lock_delay_ms: 1000,
            slip_enter_ms: 800,
            slip_hold_ms: 7000,
            slip_exit_ms: 600,
            beep_frequency_hz: 3000,
            beep_duration_ms: 2000,
            candidates: Vec::new(),
        }
    }
}

impl Settings {
    pub fn timings(&self) -> Timings {
        Timings {
            lock_delay: Duration::from_millis(self.lock_delay_ms),
            slip_enter: Duration::from_millis(self.slip_enter_ms),
            slip_hold: Duration::from_millis(self.slip_hold_ms),
            slip_exit: Duration::from_millis(self.slip_exit_ms),
            beep_frequency_hz: self.beep_frequency_hz,
            beep_duration: Duration::from_millis(self.beep_duration_ms),
        }
    }

    pub fn registry(&self) -> anyhow::Result<CandidateRegistry> {
        if self.candidates.is_empty() {
            return Ok(CandidateRegistry::default_catalog());
        }
        let candidates = self
            .candidates
            .iter()
            .map(|entry| Candidate {
                id: CandidateId(entry.id),
                name: entry.name.clone(),
                symbol_ref: entry
                    .symbol
                    .clone()
                    .unwrap_or_else(|| format!("assets/logos/candidate-{}.png", entry.id)),
            })
            .collect();
        CandidateRegistry::new(candidates)
    }
}

pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<Settings>(&raw) {
            Ok(file_cfg) => settings = file_cfg,
            Err(error) => {
                warn!(path = %config_path.display(), %error, "config file unparseable; using defaults");
            }
        }
    }

    if let Ok(v) = std::env::var("MACHINE__TALLY_PATH") {
        settings.tally_path = v;
    }
    if let Ok(v) = std::env::var("MACHINE__LOCK_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.lock_delay_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("MACHINE__SLIP_ENTER_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.slip_enter_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("MACHINE__SLIP_HOLD_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.slip_hold_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("MACHINE__SLIP_EXIT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.slip_exit_ms = parsed;
        }
    }
    if let Ok(v) = std::env::var("MACHINE__BEEP_FREQUENCY_HZ") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.beep_frequency_hz = parsed;
        }
    }
    if let Ok(v) = std::env::var("MACHINE__BEEP_DURATION_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.beep_duration_ms = parsed;
        }
    }

    settings
}
