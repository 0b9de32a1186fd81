use anyhow::{Context, Result};
use std::{fs, path::Path, path::PathBuf};

use crate::reconcile::ReconcileConfig;

/// Reconciliation thresholds loaded from a JSON settings file.
///
/// Every field is optional in the file; missing ones keep their defaults.
pub struct SettingsStore {
    path: Option<PathBuf>,
    config: ReconcileConfig,
}

impl SettingsStore {
    /// Defaults only, no backing file.
    pub fn defaults() -> Self {
        Self {
            path: None,
            config: ReconcileConfig::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config: ReconcileConfig = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid settings in {}", path.display()))?
        } else {
            log::info!("No settings at {}; using defaults", path.display());
            ReconcileConfig::default()
        };

        config
            .validate()
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            config,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"sessionMatchToleranceSecs": 10, "tolerances": {{"totalTimes": 0.5}}}}"#
        )
        .unwrap();

        let store = SettingsStore::load(file.path()).unwrap();
        let config = store.config();
        assert_eq!(config.session_match_tolerance_secs, 10);
        assert_eq!(config.tolerances.total_times, 0.5);
        assert_eq!(config.tolerances.aborted_total_times, 5.0);
        assert_eq!(config.build_id_cutoff, 20150722000000);
        assert_eq!(store.path(), Some(file.path()));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::load(&dir.path().join("settings.json")).unwrap();
        assert_eq!(store.config(), &ReconcileConfig::default());
    }

    #[test]
    fn out_of_range_window_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"defaultBrowserWindowSecs": 9223372036854775807}}"#).unwrap();

        let err = SettingsStore::load(file.path()).err().unwrap();
        assert!(format!("{err:#}").contains("defaultBrowserWindowSecs"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(SettingsStore::load(file.path()).is_err());
    }
}
