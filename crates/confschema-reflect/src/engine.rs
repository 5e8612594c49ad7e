//! # Schema Derivation Engine
//!
//! Walks a [`TypeGraph`] from a root record and produces the
//! [`SchemaDocument`] published as a component's configuration artifact.
//!
//! ## Field Rules
//!
//! For every exported field of a record, in declaration order:
//!
//! 1. Embedded records are flattened into the parent. Embedded non-records
//!    (interfaces, primitives) contribute nothing.
//! 2. The external name is resolved by [`FieldDescriptor::external_name`];
//!    suppressed fields are skipped.
//! 3. The field is required unless it sits behind a pointer or is marked
//!    omit-empty. Fields holding an optional wrapper are never required.
//!    When two fields resolve to the same name, the later one replaces the
//!    earlier property and its required status.
//! 4. The node is derived from the pointer-stripped type. Durations and
//!    wrapper payloads are emitted as is; every other node gets the field's
//!    description if one is found.
//!
//! ## Cycles
//!
//! Records currently being expanded, and optional wrappers whose payload is
//! being derived, are tracked on a stack. A record that
//! is reached again while it is still on the stack derives to an open
//! object, so self-referential configurations terminate. A record shared by
//! two unrelated fields is expanded at both sites.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use confschema_core::{SchemaDocument, SchemaNode, SchemaType, DRAFT_2020_12};

use crate::docs::DocExtractor;
use crate::error::DeriveError;
use crate::graph::{FieldDescriptor, TypeGraph, TypeId};
use crate::shape::{Conventions, Shape};

/// Knobs for [`SchemaDeriver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    /// Written as `$schema` on the root document.
    pub schema_uri: String,
    /// Appended to the root type name to form the document title.
    pub title_suffix: String,
    pub conventions: Conventions,
}

impl Default for DeriveOptions {
    fn default() -> Self {
        Self {
            schema_uri: DRAFT_2020_12.to_string(),
            title_suffix: " Configuration".to_string(),
            conventions: Conventions::default(),
        }
    }
}

/// Derives JSON Schema documents from type graphs.
///
/// Holds no per-derivation state; one deriver may serve any number of
/// graphs and threads.
#[derive(Debug, Clone, Default)]
pub struct SchemaDeriver {
    options: DeriveOptions,
    docs: Option<Arc<DocExtractor>>,
}

impl SchemaDeriver {
    pub fn new(options: DeriveOptions) -> Self {
        Self { options, docs: None }
    }

    /// Pull field descriptions from source documentation.
    pub fn with_docs(mut self, docs: Arc<DocExtractor>) -> Self {
        self.docs = Some(docs);
        self
    }

    pub fn options(&self) -> &DeriveOptions {
        &self.options
    }

    /// Derive the configuration document for `root`.
    ///
    /// The root may sit behind pointers but must be a record. Its
    /// `properties` are always present, even when empty.
    ///
    /// # Errors
    ///
    /// `RootNotRecord` if `root` is not a record; `UnknownType` if any
    /// handle reached from it is missing from `graph`.
    pub fn derive(&self, graph: &TypeGraph, root: TypeId) -> Result<SchemaDocument, DeriveError> {
        let (root, _) = graph.strip_pointers(root)?;
        let descriptor = graph.resolve(root)?;
        let Some(fields) = descriptor.fields() else {
            return Err(DeriveError::RootNotRecord {
                type_name: descriptor.display_name(),
            });
        };

        let mut walk = Walk::new(self, graph);
        walk.in_progress.push(root);
        let (properties, required) = walk.collect_fields(root, fields)?;

        let name = descriptor.name.as_deref().unwrap_or("Anonymous");
        tracing::debug!(
            root = name,
            properties = properties.len(),
            required = required.len(),
            "derived configuration schema"
        );

        Ok(SchemaDocument {
            schema: self.options.schema_uri.clone(),
            ty: SchemaType::Object,
            title: format!("{name}{}", self.options.title_suffix),
            properties,
            required,
        })
    }

    /// Derive the node for an arbitrary type, as it would appear in a
    /// field position (without a description).
    pub fn derive_type(&self, graph: &TypeGraph, id: TypeId) -> Result<SchemaNode, DeriveError> {
        Walk::new(self, graph).type_node(id)
    }

    /// [`SchemaDeriver::derive`] serialized to the pretty-printed artifact form.
    pub fn derive_json(&self, graph: &TypeGraph, root: TypeId) -> Result<String, DeriveError> {
        Ok(self.derive(graph, root)?.to_json_pretty()?)
    }
}

/// State of one derivation.
struct Walk<'a> {
    deriver: &'a SchemaDeriver,
    graph: &'a TypeGraph,
    in_progress: Vec<TypeId>,
}

impl<'a> Walk<'a> {
    fn new(deriver: &'a SchemaDeriver, graph: &'a TypeGraph) -> Self {
        Self {
            deriver,
            graph,
            in_progress: Vec::new(),
        }
    }

    fn conventions(&self) -> &'a Conventions {
        &self.deriver.options.conventions
    }

    fn type_node(&mut self, id: TypeId) -> Result<SchemaNode, DeriveError> {
        let (id, _) = self.graph.strip_pointers(id)?;
        let node = match Shape::classify(self.graph, id, self.conventions())? {
            Shape::Primitive(ty) => SchemaNode::of(ty),
            Shape::Sequence(element) => SchemaNode::array(self.type_node(element)?),
            Shape::Map(value) => SchemaNode::map(self.type_node(value)?),
            Shape::Composite(fields) => self.record_node(id, fields)?,
            Shape::OptionalWrapper(fields) => self.unwrap_wrapper(id, fields)?,
            Shape::SemanticDuration => SchemaNode::duration(),
            Shape::SemanticTimestamp => SchemaNode::timestamp(),
            Shape::Opaque => SchemaNode::opaque(),
        };
        Ok(node)
    }

    fn record_node(&mut self, id: TypeId, fields: &'a [FieldDescriptor]) -> Result<SchemaNode, DeriveError> {
        if self.in_progress.contains(&id) {
            tracing::debug!(record = %self.type_label(id), "recursive record; emitting open object");
            return Ok(SchemaNode::opaque());
        }
        self.in_progress.push(id);
        let collected = self.collect_fields(id, fields);
        self.in_progress.pop();
        let (properties, required) = collected?;
        Ok(SchemaNode::object(properties, required))
    }

    fn collect_fields(
        &mut self,
        owner: TypeId,
        fields: &'a [FieldDescriptor],
    ) -> Result<(BTreeMap<String, SchemaNode>, Vec<String>), DeriveError> {
        let mut properties = BTreeMap::new();
        let mut required = Vec::new();
        self.collect_into(owner, fields, &mut properties, &mut required)?;
        Ok((properties, required))
    }

    fn collect_into(
        &mut self,
        owner: TypeId,
        fields: &'a [FieldDescriptor],
        properties: &mut BTreeMap<String, SchemaNode>,
        required: &mut Vec<String>,
    ) -> Result<(), DeriveError> {
        for field in fields.iter().filter(|f| f.exported) {
            if field.embedded {
                self.flatten_embedded(field, properties, required)?;
                continue;
            }
            let Some(name) = field.external_name() else {
                continue;
            };
            let (node, is_required) = self.field_node(owner, field)?;
            // A later field with the same name replaces the earlier one,
            // requiredness included.
            if !is_required {
                required.retain(|r| r != &name);
            } else if !required.contains(&name) {
                required.push(name.clone());
            }
            properties.insert(name, node);
        }
        Ok(())
    }

    fn flatten_embedded(
        &mut self,
        field: &FieldDescriptor,
        properties: &mut BTreeMap<String, SchemaNode>,
        required: &mut Vec<String>,
    ) -> Result<(), DeriveError> {
        let graph = self.graph;
        let (target, _) = graph.strip_pointers(field.ty)?;
        let Some(inner) = graph.resolve(target)?.fields() else {
            return Ok(());
        };
        if self.in_progress.contains(&target) {
            tracing::debug!(record = %self.type_label(target), "record embeds itself; skipping");
            return Ok(());
        }
        self.in_progress.push(target);
        let collected = self.collect_into(target, inner, properties, required);
        self.in_progress.pop();
        collected
    }

    /// Node for one field of `owner`, and whether the field is required.
    fn field_node(&mut self, owner: TypeId, field: &FieldDescriptor) -> Result<(SchemaNode, bool), DeriveError> {
        let (target, indirect) = self.graph.strip_pointers(field.ty)?;
        let required = !indirect && !field.tags.omit_empty;

        match Shape::classify(self.graph, target, self.conventions())? {
            Shape::SemanticDuration => return Ok((SchemaNode::duration(), required)),
            Shape::OptionalWrapper(fields) => return Ok((self.unwrap_wrapper(target, fields)?, false)),
            _ => {}
        }

        let mut node = self.type_node(target)?;
        if let Some(description) = self.describe_field(owner, field) {
            node.description = Some(description);
        }
        Ok((node, required))
    }

    /// Source documentation, then the explicit description, then a note
    /// that reads as a single phrase.
    fn describe_field(&self, owner: TypeId, field: &FieldDescriptor) -> Option<String> {
        self.doc_comment(owner, field)
            .or_else(|| field.tags.description.clone().filter(|d| !d.is_empty()))
            .or_else(|| {
                field
                    .tags
                    .note
                    .clone()
                    .filter(|n| !n.is_empty() && !n.contains(','))
            })
    }

    fn doc_comment(&self, owner: TypeId, field: &FieldDescriptor) -> Option<String> {
        let docs = self.deriver.docs.as_ref()?;
        let owner = self.graph.get(owner)?;
        let (name, module) = (owner.name.as_ref()?, owner.module.as_ref()?);
        docs.lookup(module, name, &field.name)
    }

    /// Payload of an optional wrapper: the conventional payload field, else
    /// the first candidate field holding a non-empty record.
    fn unwrap_wrapper(&mut self, wrapper: TypeId, fields: &'a [FieldDescriptor]) -> Result<SchemaNode, DeriveError> {
        let conventions = self.conventions();
        let payload = fields
            .iter()
            .find(|f| f.name == conventions.wrapper_payload_field)
            .or_else(|| {
                fields.iter().find(|f| {
                    f.exported
                        && !conventions.wrapper_ignored_fields.contains(&f.name)
                        && self.is_populated_record(f.ty)
                })
            });

        match payload {
            Some(field) => {
                if self.in_progress.contains(&wrapper) {
                    tracing::debug!(wrapper = %self.type_label(wrapper), "optional wrapper reaches itself; emitting open object");
                    return Ok(SchemaNode::opaque());
                }
                self.in_progress.push(wrapper);
                let node = self.type_node(field.ty);
                self.in_progress.pop();
                node
            }
            None => {
                tracing::debug!(wrapper = %self.type_label(wrapper), "no payload in optional wrapper; emitting open object");
                Ok(SchemaNode::opaque())
            }
        }
    }

    fn is_populated_record(&self, id: TypeId) -> bool {
        self.graph
            .strip_pointers(id)
            .ok()
            .and_then(|(target, _)| self.graph.get(target))
            .and_then(|d| d.fields())
            .is_some_and(|fields| !fields.is_empty())
    }

    fn type_label(&self, id: TypeId) -> String {
        self.graph
            .get(id)
            .map(|d| d.display_name())
            .unwrap_or_else(|| id.to_string())
    }
}
