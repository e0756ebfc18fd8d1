//! JSON-string boundary for embedding hosts.
//!
//! Callers that hold raw JSON text (editors, HTTP handlers) go through here;
//! callers that already hold `serde_json::Value`s use `validate` directly.
//! Parse failures come back as a normal outcome with one error, the boundary
//! never panics or raises.

use serde_json::Value;

use crate::error::{IssueCode, ValidationIssue};
use crate::schema::SchemaIndex;
use crate::validate::{ValidationOutcome, ValidationPolicy, validate_node, validate_workflow};

/// Validate a workflow document given as a JSON string.
pub fn validate_workflow_json(
    json: &str,
    schemas: &SchemaIndex,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    match parse(json, "workflow") {
        Ok(document) => validate_workflow(&document, schemas, policy),
        Err(outcome) => outcome,
    }
}

/// Validate a single node instance given as a JSON string.
pub fn validate_node_json(
    json: &str,
    schemas: &SchemaIndex,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    match parse(json, "node") {
        Ok(node) => ValidationOutcome::from_issues(validate_node(&node, schemas, policy)),
        Err(outcome) => outcome,
    }
}

fn parse(json: &str, what: &str) -> Result<Value, ValidationOutcome> {
    serde_json::from_str(json).map_err(|e| {
        ValidationOutcome::from_issues(vec![ValidationIssue::error(
            IssueCode::InvalidType,
            format!("failed to parse {what} JSON: {e}"),
        )])
    })
}
