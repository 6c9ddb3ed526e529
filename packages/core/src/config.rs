//! Family tree configuration
//!
//! Loaded from an optional JSON file. Every field carries `#[serde(default)]`, so a
//! partial file (or none at all) yields working defaults.
//!
//! ```json
//! {
//!   "cyclePolicy": "promote_as_root",
//!   "layout": { "cardWidth": 240 },
//!   "dataPath": "/srv/family/members.json"
//! }
//! ```

use crate::tree::{BuildOptions, CyclePolicy, LayoutConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid layout configuration: {0}")]
    InvalidLayout(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyTreeConfig {
    /// Handling of records on parent cycles that no root reaches
    #[serde(default)]
    pub cycle_policy: CyclePolicy,

    #[serde(default)]
    pub layout: LayoutConfig,

    /// Record file used by file-backed tools; `None` means the tool's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
}

impl FamilyTreeConfig {
    /// Load configuration from `path`, or defaults if the file doesn't exist
    ///
    /// The loaded configuration is validated before it is returned.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let exists = fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if !exists {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.layout.validate().map_err(ConfigError::InvalidLayout)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::default().with_cycle_policy(self.cycle_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let config = assert_ok!(FamilyTreeConfig::load(dir.path().join("absent.json")).await);

        assert_eq!(config, FamilyTreeConfig::default());
        assert_eq!(config.build_options().cycle_policy, CyclePolicy::Exclude);
    }

    #[tokio::test]
    async fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "cyclePolicy": "promote_as_root", "layout": {{ "cardWidth": 240 }} }}"#
        )
        .unwrap();

        let config = FamilyTreeConfig::load(file.path()).await.unwrap();

        assert_eq!(config.cycle_policy, CyclePolicy::PromoteAsRoot);
        assert_eq!(config.layout.card_width, 240);
        assert_eq!(config.layout.card_height, LayoutConfig::default().card_height);
        assert!(config.data_path.is_none());
    }

    #[tokio::test]
    async fn test_odd_card_width_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "layout": {{ "cardWidth": 221 }} }}"#).unwrap();

        let err = assert_err!(FamilyTreeConfig::load(file.path()).await);
        assert!(matches!(err, ConfigError::InvalidLayout(_)));
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error() {
        let file = NamedTempFile::new().unwrap();

        // A regular file cannot be a directory, so the lookup below it fails
        let err = assert_err!(FamilyTreeConfig::load(file.path().join("config.json")).await);
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_malformed_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = assert_err!(FamilyTreeConfig::load(file.path()).await);
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
