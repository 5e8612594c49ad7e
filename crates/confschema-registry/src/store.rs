//! # Artifact Stores
//!
//! Where schema artifacts live. A store is partitioned by version; each
//! partition holds `{category}_{name}.json` files. The registry only reads
//! from a store, so stores need no internal locking beyond what their
//! backing medium provides.

use std::collections::BTreeMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use confschema_core::SchemaVersion;

use crate::error::RegistryError;

/// Read-only access to versioned schema artifacts.
pub trait ArtifactStore: Send + Sync + fmt::Debug {
    /// Versions with a partition in the store, in no particular order.
    /// Partitions whose names are not versions are skipped.
    fn versions(&self) -> Result<Vec<SchemaVersion>, RegistryError>;

    /// File names inside one version partition.
    ///
    /// # Errors
    ///
    /// `RegistryError::Store` when the partition does not exist or cannot
    /// be enumerated.
    fn artifact_names(&self, version: &SchemaVersion) -> Result<Vec<String>, RegistryError>;

    /// Contents of one artifact, or `None` if it does not exist.
    fn read(&self, version: &SchemaVersion, file_name: &str) -> Result<Option<Vec<u8>>, RegistryError>;
}

/// Artifacts on disk, one `<prefix><version>` subdirectory per version:
///
/// ```text
/// schemas/
///   v0.137.0/receiver_otlp.json
///   v0.138.0/receiver_otlp.json
///   v0.138.0/exporter_debug.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    prefix: String,
}

impl DirectoryStore {
    /// Store rooted at `root` with `v`-prefixed partitions.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: "v".to_string(),
        }
    }

    /// Use a different partition prefix (may be empty).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one version partition.
    pub fn partition(&self, version: &SchemaVersion) -> PathBuf {
        self.root.join(format!("{}{version}", self.prefix))
    }
}

impl ArtifactStore for DirectoryStore {
    fn versions(&self) -> Result<Vec<SchemaVersion>, RegistryError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| RegistryError::Store {
            reason: format!("{}: {e}", self.root.display()),
        })?;

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(raw) = name.strip_prefix(self.prefix.as_str()) else {
                continue;
            };
            match SchemaVersion::parse(raw) {
                Ok(version) => versions.push(version),
                Err(e) => tracing::debug!(partition = name, error = %e, "skipping non-version partition"),
            }
        }
        Ok(versions)
    }

    fn artifact_names(&self, version: &SchemaVersion) -> Result<Vec<String>, RegistryError> {
        let dir = self.partition(version);
        let entries = std::fs::read_dir(&dir).map_err(|e| RegistryError::Store {
            reason: format!("{}: {e}", dir.display()),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn read(&self, version: &SchemaVersion, file_name: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        match std::fs::read(self.partition(version).join(file_name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RegistryError::Io(e)),
        }
    }
}

/// Artifacts held in memory. Useful for embedding a fixed schema set and
/// for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    partitions: BTreeMap<SchemaVersion, BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact, builder style.
    pub fn with_artifact(mut self, version: SchemaVersion, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(version, file_name, bytes);
        self
    }

    /// Add or replace an artifact.
    pub fn insert(&mut self, version: SchemaVersion, file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.partitions
            .entry(version)
            .or_default()
            .insert(file_name.into(), bytes.into());
    }
}

impl ArtifactStore for MemoryStore {
    fn versions(&self) -> Result<Vec<SchemaVersion>, RegistryError> {
        Ok(self.partitions.keys().cloned().collect())
    }

    fn artifact_names(&self, version: &SchemaVersion) -> Result<Vec<String>, RegistryError> {
        self.partitions
            .get(version)
            .map(|files| files.keys().cloned().collect())
            .ok_or_else(|| RegistryError::Store {
                reason: format!("no partition for v{version}"),
            })
    }

    fn read(&self, version: &SchemaVersion, file_name: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        Ok(self
            .partitions
            .get(version)
            .and_then(|files| files.get(file_name))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> SchemaVersion {
        SchemaVersion::parse(s).unwrap()
    }

    // ---- directory ----

    #[test]
    fn test_directory_versions_skip_noise() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["v0.137.0", "v0.138.0", "vnext", "scratch"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("v9.9.9"), b"not a dir").unwrap();

        let store = DirectoryStore::new(dir.path());
        let mut versions = store.versions().unwrap();
        versions.sort();
        assert_eq!(versions, vec![v("0.137.0"), v("0.138.0")]);
    }

    #[test]
    fn test_directory_read_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let partition = dir.path().join("v0.138.0");
        std::fs::create_dir(&partition).unwrap();
        std::fs::write(partition.join("receiver_otlp.json"), b"{}").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert_eq!(store.artifact_names(&v("0.138.0")).unwrap(), vec!["receiver_otlp.json"]);
        assert_eq!(store.read(&v("0.138.0"), "receiver_otlp.json").unwrap(), Some(b"{}".to_vec()));
        assert_eq!(store.read(&v("0.138.0"), "receiver_missing.json").unwrap(), None);
        assert_eq!(store.read(&v("1.0.0"), "receiver_otlp.json").unwrap(), None);
    }

    #[test]
    fn test_directory_missing_partition_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let err = store.artifact_names(&v("99.99.99")).unwrap_err();
        assert!(err.to_string().contains("failed to read schema directory"));
    }

    #[test]
    fn test_directory_custom_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("1.2.3")).unwrap();
        let store = DirectoryStore::new(dir.path()).with_prefix("");
        assert_eq!(store.versions().unwrap(), vec![v("1.2.3")]);
        assert_eq!(store.partition(&v("1.2.3")), dir.path().join("1.2.3"));
    }

    // ---- memory ----

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new()
            .with_artifact(v("0.1.0"), "exporter_debug.json", "{}")
            .with_artifact(v("0.2.0"), "exporter_debug.json", "{\"title\":\"x\"}");
        assert_eq!(store.versions().unwrap(), vec![v("0.1.0"), v("0.2.0")]);
        assert_eq!(store.artifact_names(&v("0.1.0")).unwrap(), vec!["exporter_debug.json"]);
        assert!(store.read(&v("0.2.0"), "exporter_debug.json").unwrap().is_some());
        assert!(store.read(&v("0.3.0"), "exporter_debug.json").unwrap().is_none());
        assert!(matches!(
            store.artifact_names(&v("0.3.0")),
            Err(RegistryError::Store { .. })
        ));
    }
}
