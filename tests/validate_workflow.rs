//! Integration tests for workflow-level validation and the JSON boundary.

mod helpers;

use flowschema::api;
use flowschema::error::{IssueCode, Severity};
use flowschema::validate::{ValidationPolicy, validate_workflow};
use serde_json::json;

#[test]
fn valid_workflow_passes() {
    let document = serde_json::from_str(include_str!("fixtures/workflow_valid.json")).unwrap();
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(outcome.valid, "unexpected issues: {:?}", outcome.issues);
    assert!(outcome.issues.is_empty());
}

#[test]
fn faulty_workflow_accumulates_everything() {
    let document = serde_json::from_str(include_str!("fixtures/workflow_faulty.json")).unwrap();
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(!outcome.valid);

    let codes: Vec<IssueCode> = outcome.issues.iter().map(|i| i.code).collect();
    assert!(codes.contains(&IssueCode::DuplicateNodeName));
    assert!(codes.contains(&IssueCode::DanglingConnectionSource));
    assert!(codes.contains(&IssueCode::DanglingConnectionTarget));
    assert!(codes.contains(&IssueCode::InvalidTypeVersion));
    assert!(codes.contains(&IssueCode::UnknownNodeType));
    assert!(codes.contains(&IssueCode::ParameterIssue));
}

#[test]
fn duplicate_names_reported_once() {
    let document = serde_json::from_str(include_str!("fixtures/workflow_faulty.json")).unwrap();
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    let duplicates: Vec<_> = outcome
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::DuplicateNodeName)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(duplicates[0].message.contains("Slack"));
    assert_eq!(duplicates[0].context.observed, Some(json!(["Slack"])));
}

#[test]
fn one_broken_node_does_not_mask_its_siblings() {
    let document = json!({
        "nodes": [
            "not an object",
            {
                "name": "Route",
                "type": "n8n-nodes-base.switch",
                "typeVersion": 1,
                "position": [0, 0],
                "parameters": {}
            }
        ],
        "connections": {}
    });
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(outcome.issues.iter().any(|i| i.code == IssueCode::InvalidType));
    assert!(
        outcome
            .issues
            .iter()
            .any(|i| i.code == IssueCode::InvalidTypeVersion
                && i.location.node_name.as_deref() == Some("Route"))
    );
}

#[test]
fn missing_top_level_keys_reported_independently() {
    let outcome = validate_workflow(&json!({}), &helpers::sample_schemas(), &ValidationPolicy::default());
    assert_eq!(outcome.issues.len(), 2);
    assert!(outcome.issues.iter().all(|i| i.code == IssueCode::MissingProperty));
}

#[test]
fn connections_must_be_an_object() {
    let document = json!({ "nodes": [], "connections": [] });
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(
        outcome
            .issues
            .iter()
            .any(|i| i.code == IssueCode::InvalidType && i.message.contains("connections"))
    );
}

#[test]
fn isolated_node_flagged_in_connected_document() {
    let document = json!({
        "nodes": [
            { "name": "A", "type": "custom.a", "typeVersion": 1, "position": [0, 0], "parameters": {} },
            { "name": "B", "type": "custom.b", "typeVersion": 1, "position": [0, 0], "parameters": {} },
            { "name": "C", "type": "custom.c", "typeVersion": 1, "position": [0, 0], "parameters": {} }
        ],
        "connections": {
            "A": { "main": [[{ "node": "B", "type": "main", "index": 0 }]] }
        }
    });
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    let isolated: Vec<_> = outcome
        .issues
        .iter()
        .filter(|i| i.code == IssueCode::IsolatedNode)
        .collect();
    assert_eq!(isolated.len(), 1);
    assert_eq!(isolated[0].location.node_name.as_deref(), Some("C"));
    assert_eq!(isolated[0].severity, Severity::Warning);
}

#[test]
fn validation_is_idempotent() {
    let document: serde_json::Value =
        serde_json::from_str(include_str!("fixtures/workflow_faulty.json")).unwrap();
    let schemas = helpers::sample_schemas();
    let first = validate_workflow(&document, &schemas, &ValidationPolicy::default());
    let second = validate_workflow(&document, &schemas, &ValidationPolicy::default());
    assert_eq!(first.valid, second.valid);
    assert_eq!(first.issues, second.issues);
}

#[test]
fn json_boundary_matches_value_level_validation() {
    let text = include_str!("fixtures/workflow_valid.json");
    let outcome = api::validate_workflow_json(text, &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(outcome.valid);

    let outcome = api::validate_workflow_json("nonsense", &helpers::sample_schemas(), &ValidationPolicy::default());
    assert!(!outcome.valid);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("failed to parse workflow JSON"));
}

#[test]
fn outcome_serializes_with_flat_projections() {
    let document = serde_json::from_str(include_str!("fixtures/workflow_faulty.json")).unwrap();
    let outcome = validate_workflow(&document, &helpers::sample_schemas(), &ValidationPolicy::default());
    let serialized = serde_json::to_value(&outcome).unwrap();

    assert_eq!(serialized["valid"], json!(false));
    assert!(serialized["errors"].as_array().is_some_and(|a| !a.is_empty()));
    assert!(serialized["warnings"].as_array().is_some_and(|a| !a.is_empty()));
    let issue = &serialized["issues"][0];
    assert!(issue["code"].is_string());
    assert!(issue["severity"].is_string());
}
