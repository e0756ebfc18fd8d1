//! Structured validation issues and the closed issue-code taxonomy.
//!
//! Issues are pure data. They accumulate into lists and are never used as
//! control flow once document-shape checks have passed.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Closed set of issue kinds emitted by schema extraction and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCode {
    #[serde(rename = "MISSING_PROPERTY")]
    MissingProperty,
    #[serde(rename = "INVALID_TYPE")]
    InvalidType,
    #[serde(rename = "UNKNOWN_NODE_TYPE")]
    UnknownNodeType,
    #[serde(rename = "INVALID_NODE_TYPE_FORMAT")]
    InvalidNodeTypeFormat,
    #[serde(rename = "DEPRECATED_NODE_TYPE_PREFIX")]
    DeprecatedNodeTypePrefix,
    #[serde(rename = "INVALID_TYPE_VERSION")]
    InvalidTypeVersion,
    #[serde(rename = "N8N_PARAMETER_VALIDATION_ERROR")]
    ParameterValidationError,
    #[serde(rename = "N8N_PARAMETER_ISSUE")]
    ParameterIssue,
    #[serde(rename = "INVALID_FILTER_SHAPE")]
    InvalidFilterShape,
    #[serde(rename = "INVALID_FIXED_COLLECTION_KEY")]
    InvalidFixedCollectionKey,
    #[serde(rename = "DUPLICATE_NODE_NAME")]
    DuplicateNodeName,
    #[serde(rename = "DANGLING_CONNECTION_SOURCE")]
    DanglingConnectionSource,
    #[serde(rename = "DANGLING_CONNECTION_TARGET")]
    DanglingConnectionTarget,
    #[serde(rename = "ISOLATED_NODE")]
    IsolatedNode,
    #[serde(rename = "DISPLAY_OPTIONS_REFERENCE")]
    DisplayOptionsReference,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingProperty => "MISSING_PROPERTY",
            IssueCode::InvalidType => "INVALID_TYPE",
            IssueCode::UnknownNodeType => "UNKNOWN_NODE_TYPE",
            IssueCode::InvalidNodeTypeFormat => "INVALID_NODE_TYPE_FORMAT",
            IssueCode::DeprecatedNodeTypePrefix => "DEPRECATED_NODE_TYPE_PREFIX",
            IssueCode::InvalidTypeVersion => "INVALID_TYPE_VERSION",
            IssueCode::ParameterValidationError => "N8N_PARAMETER_VALIDATION_ERROR",
            IssueCode::ParameterIssue => "N8N_PARAMETER_ISSUE",
            IssueCode::InvalidFilterShape => "INVALID_FILTER_SHAPE",
            IssueCode::InvalidFixedCollectionKey => "INVALID_FIXED_COLLECTION_KEY",
            IssueCode::DuplicateNodeName => "DUPLICATE_NODE_NAME",
            IssueCode::DanglingConnectionSource => "DANGLING_CONNECTION_SOURCE",
            IssueCode::DanglingConnectionTarget => "DANGLING_CONNECTION_TARGET",
            IssueCode::IsolatedNode => "ISOLATED_NODE",
            IssueCode::DisplayOptionsReference => "DISPLAY_OPTIONS_REFERENCE",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Where an issue was found: node identity plus a dotted parameter path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// Observed/expected values and a free-text hint attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl IssueContext {
    fn is_empty(&self) -> bool {
        self.observed.is_none() && self.expected.is_none() && self.hint.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub location: IssueLocation,
    #[serde(default, skip_serializing_if = "IssueContext::is_empty")]
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        ValidationIssue {
            code,
            severity: Severity::Error,
            message: message.into(),
            location: IssueLocation::default(),
            context: IssueContext::default(),
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        ValidationIssue {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn for_node(mut self, name: impl Into<String>) -> Self {
        self.location.node_name = Some(name.into());
        self
    }

    pub fn for_node_type(mut self, node_type: impl Into<String>) -> Self {
        self.location.node_type = Some(node_type.into());
        self
    }

    pub fn for_node_id(mut self, id: impl Into<String>) -> Self {
        self.location.node_id = Some(id.into());
        self
    }

    pub fn at_parameter(mut self, path: impl Into<String>) -> Self {
        self.location.parameter = Some(path.into());
        self
    }

    pub fn observed(mut self, value: Value) -> Self {
        self.context.observed = Some(value);
        self
    }

    pub fn expected(mut self, value: Value) -> Self {
        self.context.expected = Some(value);
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.context.hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(node) = &self.location.node_name {
            write!(f, " (node '{}')", node)?;
        }
        if let Some(param) = &self.location.parameter {
            write!(f, " (parameter '{}')", param)?;
        }
        Ok(())
    }
}

/// Faults raised by a descriptor provider for a single entry. Batch extraction
/// catches these per entry and skips, it never aborts the batch.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("malformed description for '{name}': {reason}")]
    Malformed { name: String, reason: String },
    #[error("provider failure for '{name}': {reason}")]
    Source { name: String, reason: String },
}
