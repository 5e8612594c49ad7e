//! # Component Categories
//!
//! Defines `ComponentType`, the fixed enumeration of component categories
//! a schema can belong to. Artifact filenames encode the category as a
//! prefix (`receiver_otlp.json`), so this module also owns the filename
//! convention in both directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Extension of every stored schema artifact.
pub const ARTIFACT_EXTENSION: &str = ".json";

/// Category of a pipeline component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    /// Ingests telemetry from an external source.
    Receiver,
    /// Transforms telemetry in flight.
    Processor,
    /// Ships telemetry to a destination.
    Exporter,
    /// Adds capabilities outside the data path (health checks, auth).
    Extension,
    /// Joins two pipelines, acting as exporter on one and receiver on the other.
    Connector,
}

impl ComponentType {
    /// Returns all categories in canonical order.
    pub fn all() -> &'static [ComponentType] {
        &[
            Self::Receiver,
            Self::Processor,
            Self::Exporter,
            Self::Extension,
            Self::Connector,
        ]
    }

    /// Returns the lowercase identifier used in filenames and serde.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receiver => "receiver",
            Self::Processor => "processor",
            Self::Exporter => "exporter",
            Self::Extension => "extension",
            Self::Connector => "connector",
        }
    }

    /// Filename of the artifact holding `name`'s schema, e.g. `receiver_otlp.json`.
    pub fn artifact_file_name(&self, name: &str) -> String {
        format!("{}_{name}{ARTIFACT_EXTENSION}", self.as_str())
    }

    /// Split an artifact filename into its category and component name.
    ///
    /// The category is everything before the first `_`, so component names
    /// may themselves contain underscores (`receiver_host_metrics.json`).
    /// Returns `None` for non-JSON files, names without a separator, empty
    /// component names, and unknown categories.
    pub fn parse_artifact_file_name(file_name: &str) -> Option<(ComponentType, String)> {
        let stem = file_name.strip_suffix(ARTIFACT_EXTENSION)?;
        let (category, name) = stem.split_once('_')?;
        if name.is_empty() {
            return None;
        }
        let category = category.parse::<ComponentType>().ok()?;
        Some((category, name.to_string()))
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receiver" => Ok(Self::Receiver),
            "processor" => Ok(Self::Processor),
            "exporter" => Ok(Self::Exporter),
            "extension" => Ok(Self::Extension),
            "connector" => Ok(Self::Connector),
            other => Err(CoreError::InvalidComponentType(other.to_string())),
        }
    }
}
