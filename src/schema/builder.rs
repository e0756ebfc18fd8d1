//! Schema extraction: raw provider descriptions → canonical node schemas.
//!
//! Extraction is best-effort per entry: a failing node type is logged and
//! skipped, sibling types are unaffected, and the batch surfaces skips as a
//! count rather than hard errors.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::descriptor::ParameterDescriptor;
use crate::error::ProviderError;
use crate::provider::{CredentialDescription, DescriptorProvider, NodeDescription, RawNodeType};
use crate::schema::{NodeSchema, SchemaIndex, defaults, nested, resource_ops};

/// One entry that failed extraction and was skipped.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: String,
}

/// The result of one extraction batch.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub schemas: SchemaIndex,
    pub credentials: Vec<CredentialDescription>,
    pub skipped: Vec<SkippedEntry>,
}

/// Build the full schema index from a descriptor provider.
pub fn build_schemas(provider: &dyn DescriptorProvider) -> Extraction {
    let mut extraction = Extraction::default();

    for name in provider.node_type_names() {
        let result = provider
            .node_type(&name)
            .and_then(|raw| build_node_schema(&name, raw));
        match result {
            Ok(schema) => {
                debug!(node_type = %name, version = schema.version, "extracted node schema");
                extraction.schemas.insert(schema);
            }
            Err(e) => {
                warn!(node_type = %name, error = %e, "skipping node type");
                extraction.skipped.push(SkippedEntry {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    for name in provider.credential_type_names() {
        match provider.credential_type(&name) {
            Ok(credential) => extraction.credentials.push(credential),
            Err(e) => {
                warn!(credential_type = %name, error = %e, "skipping credential type");
                extraction.skipped.push(SkippedEntry {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    if !extraction.skipped.is_empty() {
        warn!(
            built = extraction.schemas.len(),
            skipped = extraction.skipped.len(),
            "extraction finished with partial coverage"
        );
    }

    extraction
}

/// Build one canonical schema from a raw node type.
pub fn build_node_schema(name: &str, raw: RawNodeType) -> Result<NodeSchema, ProviderError> {
    let (version, available_versions, description) = resolve_version(name, raw)?;

    // A malformed descriptor degrades this node's defaults to {} rather than
    // aborting the batch.
    let computed_defaults = match defaults::computed_defaults(&description.properties) {
        Ok(map) => map,
        Err(e) => {
            warn!(node_type = %name, error = %e, "defaults evaluation failed, degrading to {{}}");
            serde_json::Map::new()
        }
    };

    let (required_parameters, optional_parameters) =
        partition_parameters(&description.properties);
    let schema_warnings = check_display_references(&description.properties);

    Ok(NodeSchema {
        type_name: description.name.clone(),
        display_name: description.display_name.clone(),
        group: description.group.clone(),
        version,
        available_versions,
        resource_operations: resource_ops::resource_operations(&description.properties),
        fixed_collections: nested::fixed_collections(&description.properties),
        filter_fields: nested::filter_fields(&description.properties),
        computed_defaults,
        required_parameters,
        optional_parameters,
        credentials: description.credentials,
        properties: description.properties,
        schema_warnings,
    })
}

/// Resolve which concrete descriptor set a raw type contributes, plus the
/// sorted list of all versions it exposes.
fn resolve_version(
    name: &str,
    raw: RawNodeType,
) -> Result<(f64, Vec<f64>, NodeDescription), ProviderError> {
    match raw {
        RawNodeType::Unversioned(description) => Ok((1.0, vec![1.0], description)),
        RawNodeType::Versioned {
            default_version,
            versions,
        } => {
            if versions.is_empty() {
                return Err(ProviderError::Malformed {
                    name: name.to_string(),
                    reason: "versioned type exposes no versions".to_string(),
                });
            }
            let mut available: Vec<f64> = versions.iter().map(|(v, _)| *v).collect();
            available.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            available.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

            let resolved = match default_version {
                Some(v) => v,
                None => *available.last().unwrap_or(&1.0),
            };
            let description = versions
                .into_iter()
                .find(|(v, _)| (*v - resolved).abs() < 1e-9)
                .map(|(_, d)| d)
                .ok_or_else(|| ProviderError::Malformed {
                    name: name.to_string(),
                    reason: format!("default version {resolved} has no descriptor set"),
                })?;
            Ok((resolved, available, description))
        }
    }
}

/// Partition the descriptors with no display options into required/optional.
/// The two sets are disjoint and together cover every ungated name.
fn partition_parameters(properties: &[ParameterDescriptor]) -> (Vec<String>, Vec<String>) {
    let mut required = Vec::new();
    let mut optional = Vec::new();
    for descriptor in properties {
        if descriptor.display_options.is_some() {
            continue;
        }
        let is_required = match descriptor.required {
            Some(explicit) => explicit,
            None => descriptor.default.is_none(),
        };
        let bucket = if is_required { &mut required } else { &mut optional };
        if !bucket.contains(&descriptor.name) {
            bucket.push(descriptor.name.clone());
        }
    }
    // A name declared both with and without a default lands in required.
    optional.retain(|name| !required.contains(name));
    (required, optional)
}

/// Every field name a show/hide predicate reads must itself be a sibling in
/// the same properties list. Violations are reported, not silently ignored.
/// Engine-provided keys (leading `@`) and slash paths into nested scopes are
/// exempt.
fn check_display_references(properties: &[ParameterDescriptor]) -> Vec<String> {
    let mut warnings = Vec::new();
    check_scope(properties, "", &mut warnings);
    for descriptor in properties {
        for group in descriptor.option_groups() {
            let scope = format!("{}.{}", descriptor.name, group.name);
            check_scope(&group.values, &scope, &mut warnings);
        }
    }
    warnings
}

fn check_scope(properties: &[ParameterDescriptor], scope: &str, warnings: &mut Vec<String>) {
    let siblings: BTreeSet<&str> = properties.iter().map(|d| d.name.as_str()).collect();
    for descriptor in properties {
        let Some(display) = &descriptor.display_options else {
            continue;
        };
        for key in display.gating_keys() {
            if key.starts_with('@') || key.contains('/') {
                continue;
            }
            if !siblings.contains(key) {
                let location = if scope.is_empty() {
                    descriptor.name.clone()
                } else {
                    format!("{scope}.{}", descriptor.name)
                };
                warnings.push(format!(
                    "displayOptions of '{location}' references unknown sibling '{key}'"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use serde_json::json;

    fn description(json: serde_json::Value) -> NodeDescription {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn versioned_type_resolves_highest_by_default() {
        let make = |v: f64| {
            description(json!({
                "name": "pkg.switch",
                "displayName": format!("Switch v{v}"),
                "properties": []
            }))
        };
        let raw = RawNodeType::Versioned {
            default_version: None,
            versions: vec![(1.0, make(1.0)), (3.2, make(3.2)), (2.0, make(2.0))],
        };
        let schema = build_node_schema("pkg.switch", raw).unwrap();
        assert_eq!(schema.version, 3.2);
        assert_eq!(schema.available_versions, vec![1.0, 2.0, 3.2]);
        assert_eq!(schema.display_name, "Switch v3.2");
    }

    #[test]
    fn explicit_default_version_wins() {
        let d1 = description(json!({ "name": "pkg.n", "displayName": "N1", "properties": [] }));
        let d2 = description(json!({ "name": "pkg.n", "displayName": "N2", "properties": [] }));
        let raw = RawNodeType::Versioned {
            default_version: Some(1.0),
            versions: vec![(1.0, d1), (2.0, d2)],
        };
        let schema = build_node_schema("pkg.n", raw).unwrap();
        assert_eq!(schema.version, 1.0);
        assert_eq!(schema.display_name, "N1");
        assert_eq!(schema.latest_version(), 2.0);
    }

    #[test]
    fn required_optional_partition_is_disjoint_and_covering() {
        let raw = RawNodeType::Unversioned(description(json!({
            "name": "pkg.http",
            "displayName": "HTTP",
            "properties": [
                { "name": "url", "type": "string" },
                { "name": "method", "type": "options", "default": "GET",
                  "options": [{ "name": "Get", "value": "GET" }] },
                { "name": "sendBody", "type": "boolean", "default": false },
                { "name": "body", "type": "string",
                  "displayOptions": { "show": { "sendBody": [true] } } }
            ]
        })));
        let schema = build_node_schema("pkg.http", raw).unwrap();
        assert_eq!(schema.required_parameters, vec!["url".to_string()]);
        assert_eq!(
            schema.optional_parameters,
            vec!["method".to_string(), "sendBody".to_string()]
        );
        for name in &schema.required_parameters {
            assert!(!schema.optional_parameters.contains(name));
        }
        // Gated fields are in neither partition.
        assert!(!schema.required_parameters.contains(&"body".to_string()));
        assert!(!schema.optional_parameters.contains(&"body".to_string()));
    }

    #[test]
    fn dangling_display_reference_is_reported() {
        let raw = RawNodeType::Unversioned(description(json!({
            "name": "pkg.broken",
            "displayName": "Broken",
            "properties": [
                { "name": "gated", "type": "string",
                  "displayOptions": { "show": { "missing": ["x"], "@version": [2] } } }
            ]
        })));
        let schema = build_node_schema("pkg.broken", raw).unwrap();
        assert_eq!(schema.schema_warnings.len(), 1);
        assert!(schema.schema_warnings[0].contains("missing"));
    }

    #[test]
    fn failing_entry_is_skipped_not_fatal() {
        let mut provider = StaticProvider::new();
        provider.insert_node(RawNodeType::Unversioned(description(json!({
            "name": "pkg.good",
            "displayName": "Good",
            "properties": [{ "name": "x", "type": "string", "default": "" }]
        }))));
        provider.insert_node(RawNodeType::Versioned {
            default_version: None,
            versions: vec![],
        });

        let extraction = build_schemas(&provider);
        assert_eq!(extraction.schemas.len(), 1);
        assert!(extraction.schemas.get("pkg.good").is_some());
        assert_eq!(extraction.skipped.len(), 1);
    }

    #[test]
    fn defaults_degrade_to_empty_on_malformed_descriptor() {
        let raw = RawNodeType::Unversioned(description(json!({
            "name": "pkg.bad",
            "displayName": "Bad",
            "properties": [
                { "name": "ok", "type": "string", "default": "v" },
                { "name": "broken", "type": "fixedCollection" }
            ]
        })));
        let schema = build_node_schema("pkg.bad", raw).unwrap();
        assert!(schema.computed_defaults.is_empty());
    }
}
