//! Effective configuration with provenance
//!
//! Pairs the merged tree with the list of sources that contributed to it,
//! each file identified by path and SHA-256 digest of its raw bytes. Shown
//! by `dev up --dry-run`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use crate::output::OutputSink;
use devcontainer_merge::ConfigTree;

use super::merge::merge_configurations;
use super::overrides::CliOverrides;

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Common,
    Project,
    Cli,
}

impl ConfigOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigOrigin::Common => "common",
            ConfigOrigin::Project => "project",
            ConfigOrigin::Cli => "cli",
        }
    }
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (None for cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Merged configuration plus where it came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged configuration object
    pub config: ConfigTree,

    /// Contributing sources in precedence order (lowest first)
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Merge the layers and record their provenance
    pub fn build(
        common_config: Option<&Path>,
        project_config: Option<&Path>,
        overrides: &CliOverrides,
        output: &dyn OutputSink,
    ) -> Self {
        let config = merge_configurations(common_config, project_config, overrides, output);

        let mut sources = Vec::new();
        if let Some(path) = common_config.filter(|p| p.exists()) {
            sources.push(file_source(ConfigOrigin::Common, path));
        }
        if let Some(path) = project_config.filter(|p| p.exists()) {
            sources.push(file_source(ConfigOrigin::Project, path));
        }
        if !overrides.is_empty() || overrides.auto_forward_ports {
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        Self {
            created_at: Utc::now(),
            config,
            sources,
        }
    }

    /// Pretty-printed merged config (2-space indent)
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.config)
    }
}

fn file_source(origin: ConfigOrigin, path: &Path) -> ConfigSource {
    let digest = match file_digest(path) {
        Ok(digest) => Some(digest),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not digest config");
            None
        }
    };

    ConfigSource {
        origin,
        path: Some(path.to_string_lossy().to_string()),
        digest,
    }
}

/// SHA-256 of a file's raw bytes, hex encoded
pub fn file_digest(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::SilentSink;
    use tempfile::TempDir;

    #[test]
    fn test_sources_in_precedence_order() {
        let dir = TempDir::new().unwrap();
        let common = dir.path().join("common.json");
        let project = dir.path().join("project.json");
        fs::write(&common, r#"{"a": 1}"#).unwrap();
        fs::write(&project, r#"{"b": 2}"#).unwrap();
        let overrides = CliOverrides {
            ports: vec!["8080".to_string()],
            ..Default::default()
        };

        let effective = EffectiveConfig::build(Some(&common), Some(&project), &overrides, &SilentSink);

        let origins: Vec<ConfigOrigin> = effective.sources.iter().map(|s| s.origin).collect();
        assert_eq!(
            origins,
            vec![ConfigOrigin::Common, ConfigOrigin::Project, ConfigOrigin::Cli]
        );
        assert_eq!(effective.config["a"], 1);
        assert_eq!(effective.config["b"], 2);
    }

    #[test]
    fn test_missing_files_not_listed() {
        let dir = TempDir::new().unwrap();
        let effective = EffectiveConfig::build(
            Some(&dir.path().join("missing.json")),
            None,
            &CliOverrides::default(),
            &SilentSink,
        );
        assert!(effective.sources.is_empty());
    }

    #[test]
    fn test_digest_of_known_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.json");
        fs::write(&path, "").unwrap();
        assert_eq!(
            file_digest(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_source_serialization_skips_empty_fields() {
        let source = ConfigSource {
            origin: ConfigOrigin::Cli,
            path: None,
            digest: None,
        };
        assert_eq!(serde_json::to_string(&source).unwrap(), r#"{"origin":"cli"}"#);
    }
}
