use crate::record::HandoffRecord;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// JSON-file persistence for the handoff record. Must survive termination of
/// either process, so every mutation goes to disk immediately.
#[derive(Debug, Clone)]
pub struct HandoffStore {
    path: PathBuf,
}

impl HandoffStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable record reads as the default record: protocol
    /// errors must leave the consumer waiting, never crash it.
    pub fn load(&self) -> HandoffRecord {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return HandoffRecord::default(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "malformed handoff record at {}: {e}; treating as empty",
                    self.path.display()
                );
                HandoffRecord::default()
            }
        }
    }

    pub fn save(&self, record: &HandoffRecord) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(record).context("encode handoff JSON")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create handoff directory: {}", parent.display()))?;
        }

        // Atomic-ish write: write temp then replace, so the other process
        // never observes a half-written record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("write temp: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace file: {}", self.path.display()))?;
        Ok(())
    }
}
