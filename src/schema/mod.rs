//! Canonical, resolved schema models.
//!
//! A [`NodeSchema`] is rebuilt wholesale on every refresh and immutable once
//! built; a [`SchemaIndex`] may be shared read-only across concurrent
//! validation calls.

pub mod builder;
pub mod defaults;
pub mod nested;
pub mod resource_ops;

pub use builder::{Extraction, SkippedEntry, build_schemas};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::descriptor::{ParameterDescriptor, ParameterType, TypeOptions};
use crate::provider::CredentialRef;

/// One extracted rule for a field nested inside a fixedCollection sub-group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
}

/// One sub-group of a fixedCollection field, with the rules extracted from
/// its nested descriptor list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCollectionOption {
    pub name: String,
    pub rules: Vec<FieldRule>,
}

/// The resolved shape of one fixedCollection-typed field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixedCollectionSchema {
    pub options: Vec<FixedCollectionOption>,
}

impl FixedCollectionSchema {
    pub fn valid_option_names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn option(&self, name: &str) -> Option<&FixedCollectionOption> {
        self.options.iter().find(|o| o.name == name)
    }
}

/// Operations and gated fields for one enumerated `resource` value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOperations {
    pub operations: Vec<String>,
    /// operation value → field names gated on this (resource, operation) pair.
    pub fields: BTreeMap<String, Vec<String>>,
}

/// The canonical, resolved form of one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSchema {
    /// Full type string, e.g. `n8n-nodes-base.slack`.
    #[serde(rename = "type")]
    pub type_name: String,
    pub display_name: String,
    #[serde(default)]
    pub group: Vec<String>,
    /// The version this schema was built from.
    pub version: f64,
    /// All versions the plugin exposes, sorted ascending.
    pub available_versions: Vec<f64>,
    /// Declaration-ordered descriptor list. Same-named duplicates are kept
    /// side by side and resolved lazily per validation context.
    pub properties: Vec<ParameterDescriptor>,
    pub computed_defaults: Map<String, Value>,
    /// Partition of the descriptors that carry no display options.
    pub required_parameters: Vec<String>,
    pub optional_parameters: Vec<String>,
    pub resource_operations: BTreeMap<String, ResourceOperations>,
    pub fixed_collections: BTreeMap<String, FixedCollectionSchema>,
    /// Names of filter-typed fields. The filter shape itself is fixed and
    /// node-independent (see `validate::filter`).
    pub filter_fields: Vec<String>,
    #[serde(default)]
    pub credentials: Vec<CredentialRef>,
    /// Build-time self-consistency findings, e.g. a display-options predicate
    /// referencing a non-sibling field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_warnings: Vec<String>,
}

impl NodeSchema {
    /// Highest available version, used as a hint on version mismatches.
    pub fn latest_version(&self) -> f64 {
        self.available_versions.last().copied().unwrap_or(self.version)
    }

    pub fn has_filter(&self) -> bool {
        !self.filter_fields.is_empty()
    }

    /// Whether the instance version is one the plugin exposes.
    pub fn supports_version(&self, version: f64) -> bool {
        self.available_versions
            .iter()
            .any(|v| (v - version).abs() < 1e-9)
    }
}

/// Read-only index of node schemas, keyed by full type string.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    schemas: BTreeMap<String, NodeSchema>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: NodeSchema) {
        self.schemas.insert(schema.type_name.clone(), schema);
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeSchema> {
        self.schemas.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeSchema)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }
}
