//! # Shape Classification
//!
//! Maps a descriptor to the closed set of shapes the derivation engine
//! dispatches on. Storage kind alone is not enough: a `Duration` stored as
//! an integer must derive to a duration string, and a generic
//! `Optional<T>` record must derive to its payload. Those semantic types
//! are recognized by name and declaring module via [`Conventions`].
//!
//! Pointers are not a shape. Callers strip them first with
//! [`TypeGraph::strip_pointers`] and track the indirection themselves.

use serde::{Deserialize, Serialize};

use confschema_core::SchemaType;

use crate::error::DeriveError;
use crate::graph::{FieldDescriptor, TypeDescriptor, TypeGraph, TypeId, TypeKind};

/// Matches a type by name and declaring module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMatcher {
    /// Exact type name, or a prefix when it ends with `*` (`Optional*`).
    pub name: String,
    /// Substring the declaring module path must contain.
    pub module: String,
}

impl TypeMatcher {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }

    /// Whether `descriptor` is named and declared as this matcher requires.
    pub fn matches(&self, descriptor: &TypeDescriptor) -> bool {
        let (Some(name), Some(module)) = (&descriptor.name, &descriptor.module) else {
            return false;
        };
        let name_ok = match self.name.strip_suffix('*') {
            Some(prefix) => name.starts_with(prefix),
            None => *name == self.name,
        };
        name_ok && module.as_str().contains(&self.module)
    }
}

/// Naming conventions for semantic types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Types serialized as duration strings (`"5s"`).
    pub durations: Vec<TypeMatcher>,
    /// Types serialized as RFC 3339 timestamps.
    pub timestamps: Vec<TypeMatcher>,
    /// Generic boxes whose presence toggles independently of their payload.
    pub optional_wrappers: Vec<TypeMatcher>,
    /// Field name holding an optional wrapper's payload.
    pub wrapper_payload_field: String,
    /// Wrapper fields never considered as payload.
    pub wrapper_ignored_fields: Vec<String>,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            durations: vec![TypeMatcher::new("Duration", "time")],
            timestamps: vec![
                TypeMatcher::new("Time", "time"),
                TypeMatcher::new("SystemTime", "time"),
                TypeMatcher::new("DateTime", "chrono"),
                TypeMatcher::new("OffsetDateTime", "time"),
            ],
            optional_wrappers: vec![TypeMatcher::new("Optional*", "configoptional")],
            wrapper_payload_field: "value".to_string(),
            wrapper_ignored_fields: vec!["_".to_string(), "flavor".to_string()],
        }
    }
}

impl Conventions {
    pub fn is_duration(&self, descriptor: &TypeDescriptor) -> bool {
        self.durations.iter().any(|m| m.matches(descriptor))
    }

    pub fn is_timestamp(&self, descriptor: &TypeDescriptor) -> bool {
        self.timestamps.iter().any(|m| m.matches(descriptor))
    }

    pub fn is_optional_wrapper(&self, descriptor: &TypeDescriptor) -> bool {
        self.optional_wrappers.iter().any(|m| m.matches(descriptor))
    }
}

/// Semantic shape of a (pointer-stripped) type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'g> {
    Primitive(SchemaType),
    /// Sequence of the element type.
    Sequence(TypeId),
    /// String-keyed map of the value type.
    Map(TypeId),
    Composite(&'g [FieldDescriptor]),
    OptionalWrapper(&'g [FieldDescriptor]),
    SemanticDuration,
    SemanticTimestamp,
    /// Polymorphic or uninterpretable; derives to an open object.
    Opaque,
}

impl<'g> Shape<'g> {
    /// Classify the descriptor behind `id`.
    ///
    /// Semantic conventions win over storage kind: a duration stored as an
    /// integer is a `SemanticDuration`, a timestamp stored as a record is a
    /// `SemanticTimestamp`. Maps whose keys are not strings and any
    /// unclassifiable kind are `Opaque`. A pointer that reaches this point
    /// (the caller did not strip it) is classified by its pointee.
    ///
    /// # Errors
    ///
    /// `UnknownType` if `id`, or a handle it references, is not in `graph`.
    pub fn classify(graph: &'g TypeGraph, id: TypeId, conventions: &Conventions) -> Result<Self, DeriveError> {
        let (id, _) = graph.strip_pointers(id)?;
        let descriptor = graph.resolve(id)?;

        if conventions.is_duration(descriptor) {
            return Ok(Self::SemanticDuration);
        }
        if conventions.is_timestamp(descriptor) {
            return Ok(Self::SemanticTimestamp);
        }

        let shape = match &descriptor.kind {
            TypeKind::String => Self::Primitive(SchemaType::String),
            TypeKind::Integer => Self::Primitive(SchemaType::Integer),
            TypeKind::Float => Self::Primitive(SchemaType::Number),
            TypeKind::Boolean => Self::Primitive(SchemaType::Boolean),
            TypeKind::Sequence(element) => Self::Sequence(*element),
            TypeKind::Map { key, value } => {
                let (key, _) = graph.strip_pointers(*key)?;
                match graph.resolve(key)?.kind {
                    TypeKind::String => Self::Map(*value),
                    _ => Self::Opaque,
                }
            }
            TypeKind::Record(fields) => {
                if graph.is_marked_wrapper(id) || conventions.is_optional_wrapper(descriptor) {
                    Self::OptionalWrapper(fields)
                } else {
                    Self::Composite(fields)
                }
            }
            // Unreachable after strip_pointers unless the pointer chain is cyclic.
            TypeKind::Pointer(_) | TypeKind::Interface | TypeKind::Other => Self::Opaque,
        };
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(graph: &TypeGraph, id: TypeId) -> Shape<'_> {
        Shape::classify(graph, id, &Conventions::default()).unwrap()
    }

    #[test]
    fn test_primitives() {
        let mut graph = TypeGraph::new();
        let s = graph.string();
        let i = graph.integer();
        let f = graph.float();
        let b = graph.boolean();
        assert_eq!(classify(&graph, s), Shape::Primitive(SchemaType::String));
        assert_eq!(classify(&graph, i), Shape::Primitive(SchemaType::Integer));
        assert_eq!(classify(&graph, f), Shape::Primitive(SchemaType::Number));
        assert_eq!(classify(&graph, b), Shape::Primitive(SchemaType::Boolean));
    }

    #[test]
    fn test_duration_overrides_integer_storage() {
        let mut graph = TypeGraph::new();
        let d = graph.describe::<std::time::Duration>();
        assert_eq!(classify(&graph, d), Shape::SemanticDuration);
    }

    #[test]
    fn test_duration_name_outside_time_module_is_not_semantic() {
        let mut graph = TypeGraph::new();
        let d = graph.named("Duration", "billing::plan", TypeKind::Integer);
        assert_eq!(classify(&graph, d), Shape::Primitive(SchemaType::Integer));
    }

    #[test]
    fn test_timestamp_record() {
        let mut graph = TypeGraph::new();
        let t = graph.describe::<chrono::DateTime<chrono::Utc>>();
        assert_eq!(classify(&graph, t), Shape::SemanticTimestamp);
    }

    #[test]
    fn test_wrapper_by_convention_and_by_mark() {
        let mut graph = TypeGraph::new();
        let by_name = graph.record("OptionalServerConfig", "collector::configoptional", Vec::new());
        assert!(matches!(classify(&graph, by_name), Shape::OptionalWrapper(_)));

        let marked = graph.record("Toggle", "app::config", Vec::new());
        assert!(matches!(classify(&graph, marked), Shape::Composite(_)));
        graph.mark_optional_wrapper(marked);
        assert!(matches!(classify(&graph, marked), Shape::OptionalWrapper(_)));
    }

    #[test]
    fn test_map_key_kinds() {
        let mut graph = TypeGraph::new();
        let s = graph.string();
        let i = graph.integer();
        let by_string = graph.map(s, i);
        let by_int = graph.map(i, s);
        assert_eq!(classify(&graph, by_string), Shape::Map(i));
        assert_eq!(classify(&graph, by_int), Shape::Opaque);
    }

    #[test]
    fn test_interface_is_opaque() {
        let mut graph = TypeGraph::new();
        let v = graph.describe::<serde_json::Value>();
        assert_eq!(classify(&graph, v), Shape::Opaque);
    }

    #[test]
    fn test_matcher_prefix() {
        let matcher = TypeMatcher::new("Optional*", "configoptional");
        let hit = TypeDescriptor::named("Optional[ServerConfig]", "x::configoptional", TypeKind::Other);
        let miss = TypeDescriptor::named("Maybe", "x::configoptional", TypeKind::Other);
        assert!(matcher.matches(&hit));
        assert!(!matcher.matches(&miss));
        assert!(!matcher.matches(&TypeDescriptor::anonymous(TypeKind::Other)));
    }
}
