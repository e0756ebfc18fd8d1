//! Workflow-level validation: document structure, name uniqueness, and
//! connection-graph integrity.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{IssueCode, ValidationIssue};
use crate::schema::SchemaIndex;
use crate::validate::{ValidationOutcome, ValidationPolicy, graph, node};
use crate::workflow;

/// Validate a full workflow document.
///
/// Fatal structural faults (non-object document, non-array `nodes`) skip the
/// deeper checks that would be meaningless without a node list, but the
/// function always returns a normal outcome, it never raises.
pub fn validate_workflow(
    document: &Value,
    schemas: &SchemaIndex,
    policy: &ValidationPolicy,
) -> ValidationOutcome {
    let mut issues = Vec::new();

    if !document.is_object() {
        issues.push(
            ValidationIssue::error(
                IssueCode::InvalidType,
                "workflow document must be a JSON object",
            )
            .observed(document.clone()),
        );
        return ValidationOutcome::from_issues(issues);
    }

    let nodes = match document.get("nodes") {
        None => {
            issues.push(ValidationIssue::error(
                IssueCode::MissingProperty,
                "workflow document is missing 'nodes'",
            ));
            None
        }
        Some(Value::Array(nodes)) => Some(nodes),
        Some(other) => {
            issues.push(
                ValidationIssue::error(IssueCode::InvalidType, "'nodes' must be an array")
                    .observed(other.clone()),
            );
            None
        }
    };

    let connections = match document.get("connections") {
        None => {
            issues.push(ValidationIssue::error(
                IssueCode::MissingProperty,
                "workflow document is missing 'connections'",
            ));
            None
        }
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidType,
                    "'connections' must be an object, not an array",
                )
                .observed(other.clone()),
            );
            None
        }
    };

    if let Some(nodes) = nodes {
        // One malformed node must not suppress findings on its siblings.
        for entry in nodes {
            issues.extend(node::validate_node(entry, schemas, policy));
        }

        check_duplicate_names(nodes, &mut issues);

        if let Some(connections) = connections {
            graph::validate_connections(nodes, connections, &mut issues);
        }
    }

    ValidationOutcome::from_issues(issues)
}

/// Any name appearing more than once is reported once per duplicate value,
/// all offending names listed together in a single issue.
fn check_duplicate_names(nodes: &[Value], issues: &mut Vec<ValidationIssue>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for node in nodes {
        if let Some(name) = workflow::node_name(node) {
            *counts.entry(name).or_default() += 1;
        }
    }

    let duplicates: Vec<&str> = counts
        .iter()
        .filter(|&(_, &count)| count > 1)
        .map(|(name, _)| *name)
        .collect();
    if !duplicates.is_empty() {
        issues.push(
            ValidationIssue::error(
                IssueCode::DuplicateNodeName,
                format!("duplicate node names: {}", duplicates.join(", ")),
            )
            .observed(serde_json::json!(duplicates)),
        );
    }
}
