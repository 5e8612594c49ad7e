//! # Schema Registry
//!
//! Serves component schemas from an [`ArtifactStore`], compiling each one
//! into a validator on first use and caching it for the registry's
//! lifetime.
//!
//! ## Caching
//!
//! Entries are keyed by `(category, name, version)`. A cache hit returns
//! the same `Arc<ComponentSchema>` every time. Loading is single-flight:
//! concurrent misses on one key serialize on a per-key gate, the first
//! caller reads and compiles the artifact, and the rest find it in the
//! cache when the gate opens. Misses on different keys load in parallel.
//!
//! Failed loads are not cached; the next request retries.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use jsonschema::Validator;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use confschema_core::{ComponentType, SchemaVersion};

use crate::config::RegistryConfig;
use crate::deprecated;
use crate::error::RegistryError;
use crate::store::{ArtifactStore, DirectoryStore};
use crate::validate::{self, ValidationResult};

/// Identity of one cached schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    pub category: ComponentType,
    pub name: String,
    pub version: SchemaVersion,
}

impl SchemaKey {
    pub fn new(category: ComponentType, name: impl Into<String>, version: SchemaVersion) -> Self {
        Self {
            category,
            name: name.into(),
            version,
        }
    }

    /// File name of the artifact inside its version partition.
    pub fn file_name(&self) -> String {
        self.category.artifact_file_name(&self.name)
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.category, self.name, self.version)
    }
}

/// A loaded component schema with its compiled validator.
pub struct ComponentSchema {
    key: SchemaKey,
    description: Option<String>,
    document: Value,
    validator: Validator,
}

impl ComponentSchema {
    /// Parse and compile an artifact.
    ///
    /// # Errors
    ///
    /// `MalformedArtifact` if the bytes are not a JSON object or the
    /// object is not a compilable schema.
    pub fn from_bytes(key: SchemaKey, bytes: &[u8]) -> Result<Self, RegistryError> {
        let malformed = |reason: String| RegistryError::MalformedArtifact {
            category: key.category,
            name: key.name.clone(),
            version: key.version.clone(),
            reason,
        };

        let document: Value =
            serde_json::from_slice(bytes).map_err(|e| malformed(format!("invalid JSON: {e}")))?;
        if !document.is_object() {
            return Err(malformed("artifact is not a JSON object".to_string()));
        }
        let validator = validate::compile(&document).map_err(malformed)?;
        let description = document
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            key,
            description,
            document,
            validator,
        })
    }

    pub fn key(&self) -> &SchemaKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn category(&self) -> ComponentType {
        self.key.category
    }

    pub fn version(&self) -> &SchemaVersion {
        &self.key.version
    }

    /// The schema's `title`, if it has one.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The parsed schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate an already parsed configuration.
    pub fn validate(&self, instance: &Value) -> ValidationResult {
        validate::check(&self.validator, instance)
    }
}

impl fmt::Debug for ComponentSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSchema")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Versioned registry of component configuration schemas.
#[derive(Debug)]
pub struct SchemaRegistry {
    store: Arc<dyn ArtifactStore>,
    cache: RwLock<HashMap<SchemaKey, Arc<ComponentSchema>>>,
    loading: Mutex<HashMap<SchemaKey, Arc<Mutex<()>>>>,
}

impl SchemaRegistry {
    pub fn new(store: impl ArtifactStore + 'static) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Registry over a shared store.
    pub fn with_store(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            store,
            cache: RwLock::new(HashMap::new()),
            loading: Mutex::new(HashMap::new()),
        }
    }

    /// Directory-backed registry described by `config`.
    ///
    /// # Errors
    ///
    /// `RegistryError::Config` if the schema root is not a directory.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        config.validate()?;
        let store = DirectoryStore::new(&config.schema_root).with_prefix(config.version_prefix.clone());
        tracing::info!(root = %config.schema_root.display(), "schema registry opened");
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// The schema for a component, loading it on first request.
    ///
    /// # Errors
    ///
    /// `NotFound` if the version has no artifact for the component;
    /// `MalformedArtifact` if the artifact cannot be parsed or compiled.
    pub fn get(
        &self,
        category: ComponentType,
        name: &str,
        version: &SchemaVersion,
    ) -> Result<Arc<ComponentSchema>, RegistryError> {
        let key = SchemaKey::new(category, name, version.clone());
        if let Some(schema) = self.cached(&key) {
            tracing::trace!(key = %key, "schema cache hit");
            return Ok(schema);
        }

        let gate = Arc::clone(self.loading.lock().entry(key.clone()).or_default());
        let _loading = gate.lock();
        if let Some(schema) = self.cached(&key) {
            return Ok(schema);
        }

        let loaded = self.load(&key).map(Arc::new);
        if let Ok(schema) = &loaded {
            self.cache.write().insert(key.clone(), Arc::clone(schema));
        }
        self.release_gate(&key, &gate);
        loaded
    }

    /// The schema document for a component, pretty-printed.
    pub fn get_json(
        &self,
        category: ComponentType,
        name: &str,
        version: &SchemaVersion,
    ) -> Result<Vec<u8>, RegistryError> {
        let schema = self.get(category, name, version)?;
        Ok(serde_json::to_vec_pretty(schema.document())?)
    }

    /// Components with an artifact in `version`, grouped by category.
    /// Files that are not `{category}_{name}.json` are ignored.
    pub fn list(&self, version: &SchemaVersion) -> Result<BTreeMap<ComponentType, BTreeSet<String>>, RegistryError> {
        let mut components: BTreeMap<ComponentType, BTreeSet<String>> = BTreeMap::new();
        for file_name in self.store.artifact_names(version)? {
            match ComponentType::parse_artifact_file_name(&file_name) {
                Some((category, name)) => {
                    components.entry(category).or_default().insert(name);
                }
                None => tracing::debug!(file = %file_name, version = %version, "ignoring non-artifact file"),
            }
        }
        Ok(components)
    }

    /// Sorted names of the components of one category in `version`.
    pub fn component_names(&self, category: ComponentType, version: &SchemaVersion) -> Result<Vec<String>, RegistryError> {
        Ok(self
            .list(version)?
            .remove(&category)
            .map(|names| names.into_iter().collect())
            .unwrap_or_default())
    }

    /// Validate a serialized configuration.
    ///
    /// # Errors
    ///
    /// Schema lookup errors as for [`SchemaRegistry::get`];
    /// `MalformedInput` if `candidate` is not valid JSON. A configuration
    /// that parses but violates the schema is `Ok` with `valid == false`.
    pub fn validate(
        &self,
        category: ComponentType,
        name: &str,
        version: &SchemaVersion,
        candidate: &[u8],
    ) -> Result<ValidationResult, RegistryError> {
        let schema = self.get(category, name, version)?;
        let instance: Value = serde_json::from_slice(candidate).map_err(|e| RegistryError::MalformedInput {
            category,
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(schema.validate(&instance))
    }

    /// Validate an already parsed configuration.
    pub fn validate_value(
        &self,
        category: ComponentType,
        name: &str,
        version: &SchemaVersion,
        candidate: &Value,
    ) -> Result<ValidationResult, RegistryError> {
        Ok(self.get(category, name, version)?.validate(candidate))
    }

    /// Every version in the store, oldest first.
    pub fn all_versions(&self) -> Result<Vec<SchemaVersion>, RegistryError> {
        let mut versions = self.store.versions()?;
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// The newest version in the store.
    ///
    /// # Errors
    ///
    /// `NoVersions` when the store has no version partitions.
    pub fn latest_version(&self) -> Result<SchemaVersion, RegistryError> {
        self.store
            .versions()?
            .into_iter()
            .max()
            .ok_or(RegistryError::NoVersions)
    }

    /// Paths of the deprecated fields in a component's schema.
    pub fn deprecated_fields(
        &self,
        category: ComponentType,
        name: &str,
        version: &SchemaVersion,
    ) -> Result<Vec<String>, RegistryError> {
        let schema = self.get(category, name, version)?;
        Ok(deprecated::deprecated_fields(schema.document()))
    }

    /// Drop one cached schema so the next request reloads it. Returns
    /// whether an entry was cached.
    pub fn invalidate(&self, category: ComponentType, name: &str, version: &SchemaVersion) -> bool {
        let key = SchemaKey::new(category, name, version.clone());
        self.cache.write().remove(&key).is_some()
    }

    /// Drop every cached schema.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Number of cached schemas.
    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Drop the loading gate for `key` unless a newer one replaced it.
    fn release_gate(&self, key: &SchemaKey, gate: &Arc<Mutex<()>>) {
        let mut loading = self.loading.lock();
        if loading.get(key).is_some_and(|current| Arc::ptr_eq(current, gate)) {
            loading.remove(key);
        }
    }

    fn cached(&self, key: &SchemaKey) -> Option<Arc<ComponentSchema>> {
        self.cache.read().get(key).cloned()
    }

    fn load(&self, key: &SchemaKey) -> Result<ComponentSchema, RegistryError> {
        let bytes = self
            .store
            .read(&key.version, &key.file_name())?
            .ok_or_else(|| RegistryError::NotFound {
                category: key.category,
                name: key.name.clone(),
                version: key.version.clone(),
            })?;
        let schema = ComponentSchema::from_bytes(key.clone(), &bytes)?;
        tracing::info!(
            category = %key.category,
            name = %key.name,
            version = %key.version,
            bytes = bytes.len(),
            "loaded component schema"
        );
        Ok(schema)
    }
}
