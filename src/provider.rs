//! The plugin descriptor source consumed by schema extraction.
//!
//! The provider is opaque: the core only consumes the shapes returned here and
//! tolerates per-entry failures. Nothing returned by a provider is mutated.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::ParameterDescriptor;
use crate::error::ProviderError;

/// A credential reference declared by a node description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

/// The raw description object a plugin declares for one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    /// Full type string, e.g. `n8n-nodes-base.slack`.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub group: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default)]
    pub credentials: Vec<CredentialRef>,
    #[serde(default)]
    pub properties: Vec<ParameterDescriptor>,
}

/// The raw description of one credential type: a simple property passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDescription {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub properties: Vec<ParameterDescriptor>,
}

/// One logical node type as exposed by a plugin: either a single concrete
/// descriptor set, or several keyed by version number.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNodeType {
    Unversioned(NodeDescription),
    Versioned {
        /// Explicit default version; absent means "highest available".
        default_version: Option<f64>,
        versions: Vec<(f64, NodeDescription)>,
    },
}

/// Yields raw descriptor objects per node/credential type name.
pub trait DescriptorProvider {
    fn node_type_names(&self) -> Vec<String>;

    fn node_type(&self, name: &str) -> Result<RawNodeType, ProviderError>;

    fn credential_type_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn credential_type(&self, name: &str) -> Result<CredentialDescription, ProviderError> {
        Err(ProviderError::UnknownType(name.to_string()))
    }
}

/// An in-memory provider backed by maps. Used by tests and by callers that
/// already hold deserialized descriptions.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    nodes: HashMap<String, RawNodeType>,
    credentials: HashMap<String, CredentialDescription>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_node(&mut self, raw: RawNodeType) {
        let name = match &raw {
            RawNodeType::Unversioned(d) => d.name.clone(),
            RawNodeType::Versioned { versions, .. } => versions
                .first()
                .map(|(_, d)| d.name.clone())
                .unwrap_or_default(),
        };
        self.nodes.insert(name, raw);
    }

    /// Parse an unversioned description from JSON and register it.
    pub fn insert_node_json(&mut self, json: &str) -> Result<(), ProviderError> {
        let description: NodeDescription =
            serde_json::from_str(json).map_err(|e| ProviderError::Malformed {
                name: "<json>".to_string(),
                reason: e.to_string(),
            })?;
        self.insert_node(RawNodeType::Unversioned(description));
        Ok(())
    }

    pub fn insert_credential(&mut self, description: CredentialDescription) {
        self.credentials.insert(description.name.clone(), description);
    }
}

impl DescriptorProvider for StaticProvider {
    fn node_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    fn node_type(&self, name: &str) -> Result<RawNodeType, ProviderError> {
        self.nodes
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownType(name.to_string()))
    }

    fn credential_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.credentials.keys().cloned().collect();
        names.sort();
        names
    }

    fn credential_type(&self, name: &str) -> Result<CredentialDescription, ProviderError> {
        self.credentials
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownType(name.to_string()))
    }
}
