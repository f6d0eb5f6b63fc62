use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use shared::{
    domain::CandidateId,
    error::MachineError,
    tally::{Tally, TallyStore},
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Durable tally record backed by a single JSON file.
///
/// Writes go to a sibling temp file first and are renamed over the target,
/// so a crash mid-write never leaves an unparseable record. Missing or
/// corrupt state reads as an empty tally.
pub struct FileTallyStore {
    path: PathBuf,
    tally: Mutex<Tally>,
}

impl FileTallyStore {
    /// Opens the store at `path`, creating the parent directory if needed
    /// and loading whatever record is already there.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        ensure_parent_dir_exists(&path)?;
        let tally = read_record(&path).await;
        Ok(Self {
            path,
            tally: Mutex::new(tally),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, tally: &Tally) -> Result<(), MachineError> {
        let bytes = serde_json::to_vec_pretty(tally)
            .map_err(|e| MachineError::persistence(format!("serialize tally record: {e}")))?;

        let tmp_path = temp_path(&self.path);
        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| {
            MachineError::persistence(format!("write '{}': {e}", tmp_path.display()))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            MachineError::persistence(format!(
                "rename '{}' over '{}': {e}",
                tmp_path.display(),
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), total = tally.total(), "tally record persisted");
        Ok(())
    }
}

#[async_trait]
impl TallyStore for FileTallyStore {
    async fn load(&self) -> Tally {
        let tally = read_record(&self.path).await;
        *self.tally.lock().await = tally.clone();
        tally
    }

    async fn record(&self, candidate_id: CandidateId) -> Result<(), MachineError> {
        let mut tally = self.tally.lock().await;
        tally.increment(candidate_id);
        self.persist(&tally).await
    }

    async fn flush(&self) -> Result<(), MachineError> {
        let tally = self.tally.lock().await;
        self.persist(&tally).await
    }

    async fn clear(&self) -> Result<(), MachineError> {
        let mut tally = self.tally.lock().await;
        *tally = Tally::new();
        self.persist(&tally).await
    }

    async fn snapshot(&self) -> Tally {
        self.tally.lock().await.clone()
    }
}

async fn read_record(path: &Path) -> Tally {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Tally::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "tally record unreadable; starting empty");
            return Tally::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(tally) => tally,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "tally record malformed; starting empty");
            Tally::new()
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    std::fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for tally record '{}'",
            parent.display(),
            path.display()
        )
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
