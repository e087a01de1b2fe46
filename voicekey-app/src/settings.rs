use anyhow::Context;
use std::path::{Path, PathBuf};
use voicekey_core::settings::HostSettings;

/// On-disk persistence for the host-local gate flags.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means a fresh install: everything off.
    pub fn load(&self) -> anyhow::Result<HostSettings> {
        if !self.path.exists() {
            return Ok(HostSettings::default());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("read settings: {}", self.path.display()))?;
        let settings: HostSettings =
            serde_json::from_slice(&bytes).context("decode settings JSON")?;
        Ok(settings)
    }

    pub fn save(&self, settings: &HostSettings) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(settings).context("encode settings JSON")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory: {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("write temp: {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace file: {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_settings() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_path(dir.path().join("settings.json"));

        let settings = HostSettings {
            has_seen_instructions: true,
            accepted_agreement: true,
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn fresh_install_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at_path(dir.path().join("settings.json"));
        let settings = store.load().unwrap();
        assert!(!settings.setup_complete());
    }
}
