//! # Schema Node Model
//!
//! The structural JSON Schema subset produced by derivation. A tree of
//! [`SchemaNode`]s is immutable once built and serializes directly to the
//! artifact format; [`SchemaDocument`] adds the root header (`$schema`,
//! `title`).
//!
//! `properties` is a `BTreeMap`, so serialized artifacts list properties in
//! sorted key order and are byte-stable across runs. `required` keeps field
//! declaration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// `$schema` identifier written into every derived artifact.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Pattern every duration-typed field must match.
pub const DURATION_PATTERN: &str = "^[0-9]+(ns|us|µs|ms|s|m|h)$";

/// Description attached to every duration-typed field.
pub const DURATION_DESCRIPTION: &str = "Duration string (e.g., '1s', '5m', '1h')";

/// JSON Schema primitive type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Value of the `additionalProperties` keyword: a flag or a value schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

/// One node of a derived schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type")]
    pub ty: SchemaType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaNode>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,

    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaNode {
    /// A bare node of the given type with no constraints.
    pub fn of(ty: SchemaType) -> Self {
        Self {
            ty,
            properties: None,
            items: None,
            additional_properties: None,
            required: Vec::new(),
            pattern: None,
            format: None,
            description: None,
        }
    }

    /// `{"type": "object", "additionalProperties": true}`: accepts any object.
    ///
    /// Used for polymorphic values and as the fallback for anything the
    /// engine cannot or will not expand (cycles, unresolvable wrappers).
    pub fn opaque() -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Allowed(true)),
            ..Self::of(SchemaType::Object)
        }
    }

    /// Duration-string node.
    pub fn duration() -> Self {
        Self {
            pattern: Some(DURATION_PATTERN.to_string()),
            description: Some(DURATION_DESCRIPTION.to_string()),
            ..Self::of(SchemaType::String)
        }
    }

    /// RFC 3339 timestamp node.
    pub fn timestamp() -> Self {
        Self {
            format: Some("date-time".to_string()),
            ..Self::of(SchemaType::String)
        }
    }

    /// Array node with the given item schema.
    pub fn array(items: SchemaNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// Object node whose values all match `value`.
    pub fn map(value: SchemaNode) -> Self {
        Self {
            additional_properties: Some(AdditionalProperties::Schema(Box::new(value))),
            ..Self::of(SchemaType::Object)
        }
    }

    /// Object node with the given properties. Empty collections are omitted.
    pub fn object(properties: BTreeMap<String, SchemaNode>, required: Vec<String>) -> Self {
        Self {
            properties: (!properties.is_empty()).then_some(properties),
            required,
            ..Self::of(SchemaType::Object)
        }
    }

    /// Look up a direct property.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties.as_ref()?.get(name)
    }

    /// Whether `name` is listed in `required`.
    pub fn requires(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Root artifact for one component configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "$schema")]
    pub schema: String,

    #[serde(rename = "type")]
    pub ty: SchemaType,

    pub title: String,

    pub properties: BTreeMap<String, SchemaNode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl SchemaDocument {
    /// Whether `name` is listed in the root `required` set.
    pub fn requires(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Serialize to a `serde_json::Value`.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serialize to pretty-printed JSON, the on-disk artifact form.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
