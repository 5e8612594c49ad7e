//! # Error Types
//!
//! Every error names the component and version it concerns so callers can
//! surface it without extra context. A configuration that fails validation
//! is not an error: it is a [`crate::ValidationResult`] with `valid == false`.

use confschema_core::{ComponentType, CoreError, SchemaVersion};
use thiserror::Error;

/// Error raised by the schema registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No artifact exists for the component in the requested version.
    #[error("schema not found for component {category} {name} (v{version})")]
    NotFound {
        category: ComponentType,
        name: String,
        version: SchemaVersion,
    },

    /// The artifact exists but is not a usable schema.
    #[error("malformed schema artifact for {category} {name} (v{version}): {reason}")]
    MalformedArtifact {
        category: ComponentType,
        name: String,
        version: SchemaVersion,
        /// Parse or compile failure.
        reason: String,
    },

    /// A category string did not name one of the five component types.
    #[error("invalid component type: {0:?}")]
    InvalidComponentType(String),

    /// A version string was not a semantic version.
    #[error("invalid schema version {input:?}: {reason}")]
    InvalidVersion {
        input: String,
        reason: String,
    },

    /// A candidate configuration is not syntactically valid JSON.
    #[error("malformed configuration for {category} {name}: {reason}")]
    MalformedInput {
        category: ComponentType,
        name: String,
        /// Parser error.
        reason: String,
    },

    /// The store holds no version partitions.
    #[error("no schema versions available")]
    NoVersions,

    /// The store could not enumerate a partition.
    #[error("failed to read schema directory: {reason}")]
    Store { reason: String },

    /// Registry configuration is invalid.
    #[error("invalid registry configuration: {reason}")]
    Config { reason: String },

    /// A schema could not be re-serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for RegistryError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidComponentType(category) => Self::InvalidComponentType(category),
            CoreError::InvalidVersion { input, reason } => Self::InvalidVersion { input, reason },
        }
    }
}
