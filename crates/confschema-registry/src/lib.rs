//! # confschema-registry - Component Schema Registry
//!
//! Serves the configuration schemas derived for pipeline components, one
//! artifact per `(category, name, version)`, and validates candidate
//! configurations against them.
//!
//! ## Layout
//!
//! - [`store`]: where artifacts live ([`DirectoryStore`] on disk,
//!   [`MemoryStore`] in memory), partitioned by version.
//! - [`registry`]: [`SchemaRegistry`], the cached, single-flight loader and
//!   the query surface (lookup, listing, versions, validation,
//!   deprecated-field discovery).
//! - [`validate`]: [`ValidationResult`] and [`Violation`].
//! - [`config`]: [`RegistryConfig`], loaded from YAML.
//!
//! ## Crate Policy
//!
//! - Depends only on `confschema-core` internally.
//! - A configuration that violates its schema is a result, never an error.
//! - No `.unwrap()` outside tests.

pub mod config;
pub mod deprecated;
pub mod error;
pub mod registry;
pub mod store;
pub mod validate;

pub use config::RegistryConfig;
pub use deprecated::deprecated_fields;
pub use error::RegistryError;
pub use registry::{ComponentSchema, SchemaKey, SchemaRegistry};
pub use store::{ArtifactStore, DirectoryStore, MemoryStore};
pub use validate::{ValidationResult, Violation};
