//! # confschema-reflect - Type-to-Schema Derivation
//!
//! Turns the description of a component's configuration type into the JSON
//! Schema document published for it.
//!
//! ## Pipeline
//!
//! 1. **Describe (`graph`, `describe`).** Configuration types are recorded
//!    in a [`TypeGraph`], either by hand or through [`Describe`]
//!    implementations. Records reference each other by [`TypeId`] handle,
//!    so recursive types are representable.
//!
//! 2. **Classify (`shape`).** Each descriptor is mapped to a [`Shape`].
//!    Durations, timestamps and optional wrappers are recognized by naming
//!    [`Conventions`] rather than storage kind.
//!
//! 3. **Document (`docs`, `locator`).** Field descriptions are recovered
//!    from the source of the declaring module by [`DocExtractor`], which
//!    parses it with `syn` and caches one index per module.
//!
//! 4. **Derive (`engine`).** [`SchemaDeriver`] walks the graph from a root
//!    record and emits a [`confschema_core::SchemaDocument`].
//!
//! ## Crate Policy
//!
//! - Derivation never fails on an unfamiliar shape; it emits an open
//!   object instead.
//! - Documentation lookup is best-effort and never surfaces an error.
//! - No `.unwrap()` outside tests.

pub mod describe;
pub mod docs;
pub mod engine;
pub mod error;
pub mod graph;
pub mod locator;
pub mod shape;

pub use describe::Describe;
pub use docs::{CommentIndex, DocExtractor};
pub use engine::{DeriveOptions, SchemaDeriver};
pub use error::{DeriveError, SourceError};
pub use graph::{FieldDescriptor, FieldTags, ModuleId, TypeDescriptor, TypeGraph, TypeId, TypeKind};
pub use locator::{CrateSourceLocator, SourceLocator, StaticSourceLocator};
pub use shape::{Conventions, Shape, TypeMatcher};
