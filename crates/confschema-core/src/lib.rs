//! # confschema-core - Shared Vocabulary
//!
//! Types shared by the derivation engine (`confschema-reflect`) and the
//! schema registry (`confschema-registry`). This crate depends on nothing
//! internal.
//!
//! ## Contents
//!
//! 1. **`ComponentType`.** The five component categories. One enum,
//!    exhaustive `match` everywhere; artifact filenames are derived from it.
//!
//! 2. **`SchemaVersion`.** Version partitions of the artifact store, ordered
//!    semantically (`0.138.0 > 0.99.0`), never lexically.
//!
//! 3. **`SchemaNode` / `SchemaDocument`.** The immutable output of
//!    derivation and the on-disk artifact format.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod component;
pub mod error;
pub mod schema;
pub mod version;

pub use component::ComponentType;
pub use error::CoreError;
pub use schema::{
    AdditionalProperties, SchemaDocument, SchemaNode, SchemaType, DRAFT_2020_12, DURATION_DESCRIPTION,
    DURATION_PATTERN,
};
pub use version::SchemaVersion;
