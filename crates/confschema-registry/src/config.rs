//! Registry configuration, loaded from YAML:
//!
//! ```yaml
//! schema_root: /usr/share/collector/schemas
//! version_prefix: v
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

fn default_version_prefix() -> String {
    "v".to_string()
}

/// Where a directory-backed registry finds its artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding one subdirectory per version.
    pub schema_root: PathBuf,
    /// Prefix of version subdirectory names.
    #[serde(default = "default_version_prefix")]
    pub version_prefix: String,
}

impl RegistryConfig {
    pub fn new(schema_root: impl Into<PathBuf>) -> Self {
        Self {
            schema_root: schema_root.into(),
            version_prefix: default_version_prefix(),
        }
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// `RegistryError::Config` if the YAML is malformed or a field has the
    /// wrong type.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        serde_yaml::from_str(yaml).map_err(|e| RegistryError::Config {
            reason: format!("failed to parse registry YAML: {e}"),
        })
    }

    /// Read and parse a YAML file. A relative `schema_root` is resolved
    /// against the file's directory.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        if config.schema_root.is_relative() {
            if let Some(parent) = path.parent() {
                config.schema_root = parent.join(&config.schema_root);
            }
        }
        Ok(config)
    }

    /// Check that `schema_root` is an existing directory.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if !self.schema_root.is_dir() {
            return Err(RegistryError::Config {
                reason: format!("schema_root {} is not a directory", self.schema_root.display()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_defaults_to_v() {
        let config = RegistryConfig::from_yaml_str("schema_root: /srv/schemas\n").unwrap();
        assert_eq!(config.schema_root, PathBuf::from("/srv/schemas"));
        assert_eq!(config.version_prefix, "v");
    }

    #[test]
    fn test_explicit_prefix() {
        let config = RegistryConfig::from_yaml_str("schema_root: s\nversion_prefix: release-\n").unwrap();
        assert_eq!(config.version_prefix, "release-");
    }

    #[test]
    fn test_missing_root_rejected() {
        let err = RegistryConfig::from_yaml_str("version_prefix: v\n").unwrap_err();
        assert!(matches!(err, RegistryError::Config { .. }));
    }

    #[test]
    fn test_from_path_resolves_relative_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        let path = dir.path().join("registry.yaml");
        std::fs::write(&path, "schema_root: schemas\n").unwrap();

        let config = RegistryConfig::from_path(&path).unwrap();
        assert_eq!(config.schema_root, dir.path().join("schemas"));
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_missing_directory() {
        let config = RegistryConfig::new("/definitely/not/here");
        assert!(matches!(config.validate(), Err(RegistryError::Config { .. })));
    }
}
