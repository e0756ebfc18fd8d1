//! Serialized schema artifacts.
//!
//! Public API: `emit(&extraction) -> EmitOutput`. Produces path/content pairs
//! only; writing them anywhere is the caller's business. Output is
//! deterministic: maps are sorted, names are sorted.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::json;

use crate::descriptor::ParameterDescriptor;
use crate::provider::CredentialDescription;
use crate::schema::{Extraction, NodeSchema};

/// A generated artifact with its path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// The complete output of the emit pass.
#[derive(Debug, Clone)]
pub struct EmitOutput {
    pub files: Vec<GeneratedFile>,
}

/// Generate every schema artifact for one extraction batch.
pub fn emit(extraction: &Extraction) -> EmitOutput {
    let mut files = Vec::new();

    for (_, schema) in extraction.schemas.iter() {
        files.push(GeneratedFile {
            path: format!("nodes/{}.json", file_stem(&schema.type_name)),
            content: pretty(schema),
        });
        files.push(GeneratedFile {
            path: format!("rules/{}.json", file_stem(&schema.type_name)),
            content: gen_rules_doc(schema),
        });
    }

    for credential in &extraction.credentials {
        files.push(GeneratedFile {
            path: format!("credentials/{}.json", file_stem(&credential.name)),
            content: gen_credential_doc(credential),
        });
    }

    files.push(GeneratedFile {
        path: "categories.json".into(),
        content: gen_categories(extraction),
    });
    files.push(GeneratedFile {
        path: "workflow.schema.json".into(),
        content: gen_workflow_schema(),
    });

    EmitOutput { files }
}

/// Scoped package names carry a slash; keep artifact paths flat.
fn file_stem(type_name: &str) -> String {
    type_name.replace('/', "_")
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// The per-node validation-rule document: one entry per declared field.
fn gen_rules_doc(schema: &NodeSchema) -> String {
    let rules: Vec<serde_json::Value> = schema.properties.iter().map(field_rule_json).collect();
    pretty(&json!({
        "type": schema.type_name,
        "version": schema.version,
        "rules": rules,
    }))
}

fn field_rule_json(descriptor: &ParameterDescriptor) -> serde_json::Value {
    let required = match descriptor.required {
        Some(explicit) => explicit,
        None => descriptor.default.is_none() && descriptor.display_options.is_none(),
    };
    let mut rule = json!({
        "name": descriptor.name,
        "type": descriptor.kind,
        "required": required,
    });
    if let Some(values) = descriptor.enum_values() {
        rule["enum"] = json!(values);
    }
    if let Some(type_options) = &descriptor.type_options {
        rule["typeOptions"] = json!(type_options);
    }
    if let Some(display) = &descriptor.display_options {
        rule["displayOptions"] = json!(display);
    }
    rule
}

/// Credential docs are a plain property passthrough.
fn gen_credential_doc(credential: &CredentialDescription) -> String {
    pretty(&json!({
        "name": credential.name,
        "displayName": credential.display_name,
        "properties": credential.properties,
    }))
}

/// Category index: category tag → sorted node-type names.
fn gen_categories(extraction: &Extraction) -> String {
    let mut categories: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (name, schema) in extraction.schemas.iter() {
        for tag in &schema.group {
            categories.entry(tag.as_str()).or_default().insert(name);
        }
    }
    pretty(&categories)
}

/// Draft-07 JSON Schema for the workflow document shape, for external
/// tooling. One serialization target, not the object model.
fn gen_workflow_schema() -> String {
    pretty(&json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "WorkflowDocument",
        "type": "object",
        "required": ["nodes", "connections"],
        "properties": {
            "name": { "type": "string" },
            "nodes": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["name", "type", "typeVersion", "position", "parameters"],
                    "properties": {
                        "id": { "type": "string" },
                        "name": { "type": "string" },
                        "type": {
                            "type": "string",
                            "pattern": "^[^.]+\\.[^.]+$|^@[^.]+/[^.]+\\.[^.]+$"
                        },
                        "typeVersion": { "type": "number" },
                        "position": {
                            "type": "array",
                            "items": { "type": "number" },
                            "minItems": 2,
                            "maxItems": 2
                        },
                        "parameters": { "type": "object" },
                        "disabled": { "type": "boolean" },
                        "alwaysOutputData": { "type": "boolean" },
                        "executeOnce": { "type": "boolean" }
                    }
                }
            },
            "connections": {
                "type": "object",
                "additionalProperties": {
                    "type": "object",
                    "additionalProperties": {
                        "type": "array",
                        "items": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "required": ["node", "type", "index"],
                                "properties": {
                                    "node": { "type": "string" },
                                    "type": { "type": "string" },
                                    "index": { "type": "integer", "minimum": 0 }
                                }
                            }
                        }
                    }
                }
            }
        }
    }))
}
