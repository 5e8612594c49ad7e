//! # Describing Rust Types
//!
//! [`Describe`] lets a Rust type add its own descriptor to a [`TypeGraph`].
//! Implementations are provided for the standard building blocks of
//! configuration structs; record types implement it by hand with
//! [`TypeGraph::describe_record`]:
//!
//! ```
//! use confschema_reflect::{Describe, FieldDescriptor, TypeGraph, TypeId};
//!
//! struct ServerConfig {
//!     endpoint: String,
//!     read_timeout: Option<std::time::Duration>,
//! }
//!
//! impl Describe for ServerConfig {
//!     fn describe(graph: &mut TypeGraph) -> TypeId {
//!         graph.describe_record::<Self>("ServerConfig", "myreceiver::config", |g| {
//!             vec![
//!                 FieldDescriptor::new("endpoint", g.describe::<String>()),
//!                 FieldDescriptor::new("read_timeout", g.describe::<Option<std::time::Duration>>()),
//!             ]
//!         })
//!     }
//! }
//!
//! let mut graph = TypeGraph::new();
//! let root = graph.describe::<ServerConfig>();
//! assert!(graph.get(root).is_some());
//! ```
//!
//! `Option<T>` maps to a pointer (the value may be absent, so the field is
//! never required). `Box<T>` and `Arc<T>` are transparent. Durations and
//! timestamps keep their real names and modules so the naming conventions
//! in [`crate::shape`] recognize them.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};

use crate::graph::{TypeGraph, TypeId, TypeKind};

/// A Rust type that can describe its shape.
pub trait Describe: 'static {
    /// Add this type's descriptor (and any it depends on) to `graph`.
    ///
    /// Call through [`TypeGraph::describe`], which memoizes the result.
    fn describe(graph: &mut TypeGraph) -> TypeId;
}

macro_rules! describe_primitive {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn describe(graph: &mut TypeGraph) -> TypeId {
                    graph.named(stringify!($ty), "core::primitive", TypeKind::$kind)
                }
            }
        )+
    };
}

describe_primitive!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_primitive!(Float => f32, f64);
describe_primitive!(Boolean => bool);

impl Describe for String {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.named("String", "alloc::string", TypeKind::String)
    }
}

impl Describe for PathBuf {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.named("PathBuf", "std::path", TypeKind::String)
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        let element = graph.describe::<T>();
        graph.sequence(element)
    }
}

impl<K: Describe, V: Describe, S: 'static> Describe for HashMap<K, V, S> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        let key = graph.describe::<K>();
        let value = graph.describe::<V>();
        graph.map(key, value)
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        let key = graph.describe::<K>();
        let value = graph.describe::<V>();
        graph.map(key, value)
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        let pointee = graph.describe::<T>();
        graph.pointer(pointee)
    }
}

impl<T: Describe> Describe for Box<T> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe::<T>()
    }
}

impl<T: Describe> Describe for Arc<T> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.describe::<T>()
    }
}

impl Describe for std::time::Duration {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        // Stored as seconds + nanos; the duration convention overrides it.
        graph.named("Duration", "core::time", TypeKind::Integer)
    }
}

impl Describe for std::time::SystemTime {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.named("SystemTime", "std::time", TypeKind::Other)
    }
}

impl<Tz: TimeZone + 'static> Describe for DateTime<Tz> {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.named("DateTime", "chrono::datetime", TypeKind::Record(Vec::new()))
    }
}

impl Describe for serde_json::Value {
    fn describe(graph: &mut TypeGraph) -> TypeId {
        graph.named("Value", "serde_json::value", TypeKind::Interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_describe_is_memoized() {
        let mut graph = TypeGraph::new();
        let a = graph.describe::<String>();
        let b = graph.describe::<String>();
        assert_eq!(a, b);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_option_is_pointer() {
        let mut graph = TypeGraph::new();
        let id = graph.describe::<Option<u16>>();
        let (pointee, indirect) = graph.strip_pointers(id).unwrap();
        assert!(indirect);
        assert_eq!(graph.get(pointee).unwrap().kind, TypeKind::Integer);
    }

    #[test]
    fn test_box_is_transparent() {
        let mut graph = TypeGraph::new();
        assert_eq!(graph.describe::<Box<bool>>(), graph.describe::<bool>());
    }

    #[test]
    fn test_map_records_key_and_value() {
        let mut graph = TypeGraph::new();
        let id = graph.describe::<HashMap<String, f64>>();
        let TypeKind::Map { key, value } = graph.get(id).unwrap().kind else {
            panic!("expected map");
        };
        assert_eq!(graph.get(key).unwrap().kind, TypeKind::String);
        assert_eq!(graph.get(value).unwrap().kind, TypeKind::Float);
    }

    #[test]
    fn test_semantic_types_keep_names() {
        let mut graph = TypeGraph::new();
        let duration = graph.describe::<std::time::Duration>();
        let timestamp = graph.describe::<DateTime<Utc>>();
        assert_eq!(graph.get(duration).unwrap().name.as_deref(), Some("Duration"));
        assert_eq!(graph.get(timestamp).unwrap().name.as_deref(), Some("DateTime"));
    }
}
