//! # Type Graph
//!
//! An arena of [`TypeDescriptor`]s describing the shape of configuration
//! types. Descriptors reference each other through [`TypeId`] handles, so
//! self-referential and mutually recursive records are representable: a
//! record is declared first (reserving its handle) and its fields are
//! defined afterwards.
//!
//! The graph is read-only input to the derivation engine. It records
//! storage kinds only; semantic meaning (durations, timestamps, optional
//! wrappers) is assigned later by [`crate::shape::Shape::classify`].

use std::any::TypeId as RustTypeId;
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::describe::Describe;
use crate::error::DeriveError;

/// Handle to a descriptor inside a [`TypeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Path of the module declaring a type, e.g. `otlpreceiver::config`.
///
/// The first `::` segment is the crate name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create a module identifier from a `::`-separated path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The full path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Crate segment of the path.
    pub fn crate_name(&self) -> &str {
        self.0.split("::").next().unwrap_or_default()
    }

    /// Path segments after the crate name.
    pub fn submodules(&self) -> impl Iterator<Item = &str> {
        self.0.split("::").skip(1).filter(|s| !s.is_empty())
    }

    /// Whether the module belongs to the standard library.
    pub fn is_builtin(&self) -> bool {
        matches!(self.crate_name(), "std" | "core" | "alloc")
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Storage kind of a type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Ordered collection of the element type.
    Sequence(TypeId),
    /// Associative map.
    Map { key: TypeId, value: TypeId },
    /// Nullable indirection; the pointee may be absent.
    Pointer(TypeId),
    /// Named-field record, fields in declaration order.
    Record(Vec<FieldDescriptor>),
    /// Arbitrary polymorphic value.
    Interface,
    /// Anything else (functions, channels, handles).
    Other,
}

impl TypeKind {
    fn label(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Sequence(_) => "sequence",
            Self::Map { .. } => "map",
            Self::Pointer(_) => "pointer",
            Self::Record(_) => "record",
            Self::Interface => "interface",
            Self::Other => "other",
        }
    }
}

/// One type in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Declared type name; `None` for anonymous types.
    pub name: Option<String>,
    /// Declaring module, used for conventions and documentation lookup.
    pub module: Option<ModuleId>,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// An anonymous descriptor of the given kind.
    pub fn anonymous(kind: TypeKind) -> Self {
        Self {
            name: None,
            module: None,
            kind,
        }
    }

    /// A named descriptor.
    pub fn named(name: impl Into<String>, module: impl Into<ModuleId>, kind: TypeKind) -> Self {
        Self {
            name: Some(name.into()),
            module: Some(module.into()),
            kind,
        }
    }

    /// Human-readable label: the name, or the kind for anonymous types.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("<{}>", self.kind.label()),
        }
    }

    /// Record fields, if this is a record.
    pub fn fields(&self) -> Option<&[FieldDescriptor]> {
        match &self.kind {
            TypeKind::Record(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Serialization metadata attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    /// Primary serialized name. `"-"` suppresses the field.
    pub name: Option<String>,
    /// Secondary serialized name, used when no primary name is set.
    /// `"-"` here is ignored rather than suppressing.
    pub alias: Option<String>,
    /// Field may be left out of a document; never required.
    pub omit_empty: bool,
    /// Explicit description.
    pub description: Option<String>,
    /// Auxiliary free-text annotation, used as a description of last resort.
    pub note: Option<String>,
}

/// One field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Source identifier of the field.
    pub name: String,
    pub ty: TypeId,
    pub tags: FieldTags,
    /// Visible to external consumers. Private fields are never emitted.
    pub exported: bool,
    /// Mixed-in sub-record whose fields flatten into the parent.
    pub embedded: bool,
}

impl FieldDescriptor {
    /// An exported, non-embedded field with no tags.
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: FieldTags::default(),
            exported: true,
            embedded: false,
        }
    }

    /// An embedded (flattened) field.
    pub fn embedded(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            embedded: true,
            ..Self::new(name, ty)
        }
    }

    /// Set the primary serialized name.
    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.tags.name = Some(name.into());
        self
    }

    /// Set the secondary serialized name.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.tags.alias = Some(alias.into());
        self
    }

    /// Mark the field as omittable.
    pub fn omit_empty(mut self) -> Self {
        self.tags.omit_empty = true;
        self
    }

    /// Attach an explicit description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.tags.description = Some(description.into());
        self
    }

    /// Attach an auxiliary note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.tags.note = Some(note.into());
        self
    }

    /// Hide the field from external consumers.
    pub fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Name under which the field appears in documents, or `None` when
    /// the field is suppressed.
    ///
    /// Primary name, then alias, then the lower-cased source name.
    pub fn external_name(&self) -> Option<String> {
        let name = match (&self.tags.name, &self.tags.alias) {
            (Some(name), _) if !name.is_empty() => name.clone(),
            (_, Some(alias)) if !alias.is_empty() && alias != "-" => alias.clone(),
            _ => self.name.to_lowercase(),
        };
        (!name.is_empty() && name != "-").then_some(name)
    }
}

/// Arena of type descriptors.
#[derive(Debug, Default)]
pub struct TypeGraph {
    types: Vec<TypeDescriptor>,
    wrappers: HashSet<TypeId>,
    described: HashMap<RustTypeId, TypeId>,
}

impl TypeGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the graph holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Add a descriptor.
    pub fn add(&mut self, descriptor: TypeDescriptor) -> TypeId {
        self.types.push(descriptor);
        TypeId(self.types.len() - 1)
    }

    /// Look up a descriptor.
    pub fn get(&self, id: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(id.0)
    }

    /// Look up a descriptor, failing with `UnknownType`.
    pub fn resolve(&self, id: TypeId) -> Result<&TypeDescriptor, DeriveError> {
        self.get(id).ok_or(DeriveError::UnknownType(id))
    }

    /// Follow pointer indirections to the pointee.
    ///
    /// Returns the pointee and whether any indirection was crossed. A
    /// pointer cycle stops at the first repeated handle.
    pub fn strip_pointers(&self, id: TypeId) -> Result<(TypeId, bool), DeriveError> {
        let mut current = id;
        let mut indirect = false;
        let mut seen = HashSet::new();
        while let TypeKind::Pointer(pointee) = self.resolve(current)?.kind {
            if !seen.insert(current) {
                break;
            }
            current = pointee;
            indirect = true;
        }
        Ok((current, indirect))
    }

    pub fn string(&mut self) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::String))
    }

    pub fn integer(&mut self) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Integer))
    }

    pub fn float(&mut self) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Float))
    }

    pub fn boolean(&mut self) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Boolean))
    }

    pub fn interface(&mut self) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Interface))
    }

    pub fn sequence(&mut self, element: TypeId) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Sequence(element)))
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Map { key, value }))
    }

    pub fn pointer(&mut self, pointee: TypeId) -> TypeId {
        self.add(TypeDescriptor::anonymous(TypeKind::Pointer(pointee)))
    }

    /// Add a named type of any kind.
    pub fn named(&mut self, name: impl Into<String>, module: impl Into<ModuleId>, kind: TypeKind) -> TypeId {
        self.add(TypeDescriptor::named(name, module, kind))
    }

    /// Reserve a handle for a record whose fields are defined later with
    /// [`TypeGraph::define_fields`]. Needed for recursive records.
    pub fn declare_record(&mut self, name: impl Into<String>, module: impl Into<ModuleId>) -> TypeId {
        self.named(name, module, TypeKind::Record(Vec::new()))
    }

    /// Replace the fields of a declared record.
    ///
    /// # Errors
    ///
    /// `UnknownType` if `id` is not in the graph; `RootNotRecord` if it is
    /// not a record.
    pub fn define_fields(&mut self, id: TypeId, fields: Vec<FieldDescriptor>) -> Result<(), DeriveError> {
        let descriptor = self.types.get_mut(id.0).ok_or(DeriveError::UnknownType(id))?;
        match &mut descriptor.kind {
            TypeKind::Record(existing) => {
                *existing = fields;
                Ok(())
            }
            _ => Err(DeriveError::RootNotRecord {
                type_name: descriptor.display_name(),
            }),
        }
    }

    /// Add a fully defined record.
    pub fn record(
        &mut self,
        name: impl Into<String>,
        module: impl Into<ModuleId>,
        fields: Vec<FieldDescriptor>,
    ) -> TypeId {
        self.named(name, module, TypeKind::Record(fields))
    }

    /// Mark a record as an optional wrapper regardless of naming conventions.
    pub fn mark_optional_wrapper(&mut self, id: TypeId) {
        self.wrappers.insert(id);
    }

    /// Whether [`TypeGraph::mark_optional_wrapper`] was called for `id`.
    pub fn is_marked_wrapper(&self, id: TypeId) -> bool {
        self.wrappers.contains(&id)
    }

    /// Describe a Rust type, reusing the handle if it was described before.
    pub fn describe<T: Describe>(&mut self) -> TypeId {
        let key = RustTypeId::of::<T>();
        if let Some(id) = self.described.get(&key) {
            return *id;
        }
        let id = T::describe(self);
        self.described.insert(key, id);
        id
    }

    /// Describe a record type `T`.
    ///
    /// The handle is reserved and memoized before `fields` runs, so a
    /// field of type `T` (through `Option<Box<T>>`, say) resolves back to
    /// the same handle instead of recursing forever.
    pub fn describe_record<T: 'static>(
        &mut self,
        name: impl Into<String>,
        module: impl Into<ModuleId>,
        fields: impl FnOnce(&mut Self) -> Vec<FieldDescriptor>,
    ) -> TypeId {
        let key = RustTypeId::of::<T>();
        if let Some(id) = self.described.get(&key) {
            return *id;
        }
        let id = self.declare_record(name, module);
        self.described.insert(key, id);
        let fields = fields(self);
        if let Some(TypeKind::Record(existing)) = self.types.get_mut(id.0).map(|d| &mut d.kind) {
            *existing = fields;
        }
        id
    }
}
