//! # Error Types
//!
//! Derivation degrades unknown shapes to an opaque object schema instead of
//! failing, so [`DeriveError`] only covers a missing descriptor, a root that
//! cannot be a configuration, and serialization of the finished document.
//! [`SourceError`] is never surfaced by derivation; documentation lookup
//! swallows it and reports no description.

use thiserror::Error;

use crate::graph::TypeId;

/// Error deriving a schema from a type graph.
#[derive(Error, Debug)]
pub enum DeriveError {
    /// A `TypeId` does not belong to the graph it was used with.
    #[error("type {0} is not present in the type graph")]
    UnknownType(TypeId),

    /// Top-level configurations must be records.
    #[error("root type {type_name} is not a record; only records can be top-level configurations")]
    RootNotRecord {
        /// Name of the offending root type, or its kind when anonymous.
        type_name: String,
    },

    /// The derived document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error locating the source text of a module.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No source is available for the module.
    #[error("no source for module {module}: {reason}")]
    Unresolvable {
        /// Module path that was looked up.
        module: String,
        /// Why it could not be resolved.
        reason: String,
    },

    /// A candidate source file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed to read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
