//! Node-level validation: one instance against its resolved schema.
//!
//! Sequential stages. A stage's findings never abort the caller; later
//! independent checks still run. Only an unknown node type (nothing to
//! validate against) short-circuits, with a single warning.

use serde_json::{Map, Value};

use crate::descriptor::{ParameterDescriptor, ParameterType, TypeOptions};
use crate::error::{IssueCode, ValidationIssue};
use crate::resolve;
use crate::schema::{FixedCollectionOption, NodeSchema, SchemaIndex};
use crate::validate::{ValidationPolicy, filter};
use crate::workflow;

const ALLOWED_TYPE_PREFIXES: [&str; 2] = ["n8n-nodes-base", "@n8n/n8n-nodes-langchain"];
/// Old prefix → the scoped replacement.
const DEPRECATED_TYPE_PREFIXES: [(&str, &str); 1] =
    [("n8n-nodes-langchain", "@n8n/n8n-nodes-langchain")];

/// typeVersion from which filter values must carry `options.version`.
const FILTER_VERSION_FLOOR: f64 = 3.2;

/// Validate a single node instance value against the schema index.
pub fn validate_node(
    node: &Value,
    schemas: &SchemaIndex,
    policy: &ValidationPolicy,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let Some(object) = node.as_object() else {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidType, "node must be a JSON object")
                .observed(node.clone()),
        );
        return issues;
    };

    check_shape(object, &mut issues);

    let Some(type_str) = workflow::node_type(node) else {
        return locate_all(issues, node);
    };

    let Some(lookup_type) = check_type_format(type_str, &mut issues) else {
        return locate_all(issues, node);
    };

    let Some(schema) = schemas.get(&lookup_type) else {
        issues.push(
            ValidationIssue::warning(
                IssueCode::UnknownNodeType,
                format!("no schema is known for node type '{type_str}'"),
            )
            .observed(Value::String(type_str.to_string())),
        );
        return locate_all(issues, node);
    };

    // Surface build-time self-consistency findings on the schema this
    // instance is being validated against.
    for warning in &schema.schema_warnings {
        issues.push(ValidationIssue::warning(
            IssueCode::DisplayOptionsReference,
            warning.clone(),
        ));
    }

    let type_version = workflow::node_type_version(node);
    if let Some(version) = type_version {
        if !schema.supports_version(version) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidTypeVersion,
                    format!("typeVersion {version} is not available for '{type_str}'"),
                )
                .observed(serde_json::json!(version))
                .expected(serde_json::json!(schema.available_versions))
                .hint(format!("latest available version is {}", schema.latest_version())),
            );
        }
    }

    if let Some(parameters) = workflow::node_parameters(node) {
        let require_filter_version =
            type_version.is_some_and(|v| v >= FILTER_VERSION_FLOOR - 1e-9);
        check_parameters(parameters, schema, policy, require_filter_version, &mut issues);
    }

    locate_all(issues, node)
}

/// Stage 1: four independent presence/type checks.
fn check_shape(object: &Map<String, Value>, issues: &mut Vec<ValidationIssue>) {
    match object.get("type") {
        None => issues.push(ValidationIssue::error(
            IssueCode::MissingProperty,
            "node is missing 'type'",
        )),
        Some(v) if !v.is_string() => issues.push(
            ValidationIssue::error(IssueCode::InvalidType, "'type' must be a string")
                .observed(v.clone()),
        ),
        Some(_) => {}
    }

    match object.get("typeVersion") {
        None => issues.push(ValidationIssue::error(
            IssueCode::MissingProperty,
            "node is missing 'typeVersion'",
        )),
        Some(v) if !v.is_number() => issues.push(
            ValidationIssue::error(IssueCode::InvalidType, "'typeVersion' must be a number")
                .observed(v.clone()),
        ),
        Some(_) => {}
    }

    match object.get("position") {
        None => issues.push(ValidationIssue::error(
            IssueCode::MissingProperty,
            "node is missing 'position'",
        )),
        Some(v) => {
            let ok = v
                .as_array()
                .is_some_and(|a| a.len() == 2 && a.iter().all(Value::is_number));
            if !ok {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::InvalidType,
                        "'position' must be an array of exactly two numbers",
                    )
                    .observed(v.clone()),
                );
            }
        }
    }

    match object.get("parameters") {
        None => issues.push(ValidationIssue::error(
            IssueCode::MissingProperty,
            "node is missing 'parameters'",
        )),
        Some(v) if !v.is_object() => issues.push(
            ValidationIssue::error(IssueCode::InvalidType, "'parameters' must be an object")
                .observed(v.clone()),
        ),
        Some(_) => {}
    }
}

/// Stage 2: `prefix.nodeName` format, prefix whitelist, deprecated prefixes.
/// Returns the type string to look the schema up under, or `None` when the
/// format is too broken to continue.
fn check_type_format(type_str: &str, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    let Some((prefix, _)) = workflow::split_type(type_str) else {
        issues.push(
            ValidationIssue::error(
                IssueCode::InvalidNodeTypeFormat,
                format!("node type '{type_str}' does not match 'prefix.nodeName'"),
            )
            .observed(Value::String(type_str.to_string())),
        );
        return None;
    };

    if let Some((_, replacement)) = DEPRECATED_TYPE_PREFIXES
        .iter()
        .find(|(old, _)| *old == prefix)
    {
        let canonical = type_str.replacen(prefix, replacement, 1);
        issues.push(
            ValidationIssue::warning(
                IssueCode::DeprecatedNodeTypePrefix,
                format!("type prefix '{prefix}' is deprecated"),
            )
            .observed(Value::String(type_str.to_string()))
            .hint(format!("use '{canonical}'")),
        );
        return Some(canonical);
    }

    if !ALLOWED_TYPE_PREFIXES.contains(&prefix) {
        issues.push(
            ValidationIssue::warning(
                IssueCode::InvalidNodeTypeFormat,
                format!("type prefix '{prefix}' is not in the known prefix set"),
            )
            .expected(serde_json::json!(ALLOWED_TYPE_PREFIXES)),
        );
    }

    Some(type_str.to_string())
}

/// Stages 3-5: resolve the visible field set under the instance's own
/// parameters and check values, filters, and fixed collections.
fn check_parameters(
    parameters: &Map<String, Value>,
    schema: &NodeSchema,
    policy: &ValidationPolicy,
    require_filter_version: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    for (key, value) in parameters {
        let declared = schema.properties.iter().any(|d| d.name == *key);
        if !declared {
            issues.push(
                ValidationIssue {
                    severity: policy.unknown_parameter,
                    ..ValidationIssue::error(
                        IssueCode::ParameterIssue,
                        format!("parameter '{key}' is not declared by '{}'", schema.type_name),
                    )
                }
                .at_parameter(key.clone()),
            );
            continue;
        }

        let Some(resolved) = resolve::resolve_by_name(&schema.properties, key, parameters) else {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::ParameterIssue,
                    format!("parameter '{key}' is not visible under the current values"),
                )
                .at_parameter(key.clone()),
            );
            continue;
        };
        if resolved.ambiguous {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::ParameterIssue,
                    format!(
                        "multiple declarations of '{key}' are visible; using the last declared"
                    ),
                )
                .at_parameter(key.clone()),
            );
        }

        check_value(resolved.descriptor, value, key, issues);

        match resolved.descriptor.kind {
            ParameterType::Filter => {
                filter::validate_filter(value, key, require_filter_version, issues);
            }
            ParameterType::FixedCollection => {
                check_fixed_collection(key, value, schema, policy, require_filter_version, issues);
            }
            _ => {}
        }
    }

    // Required-and-visible fields must be present. Candidates are resolved
    // per name so a gated duplicate only counts when its declaration applies.
    let mut seen: Vec<&str> = Vec::new();
    for descriptor in &schema.properties {
        if seen.contains(&descriptor.name.as_str()) {
            continue;
        }
        seen.push(&descriptor.name);
        let Some(resolved) = resolve::resolve_by_name(&schema.properties, &descriptor.name, parameters)
        else {
            continue;
        };
        if resolve::is_required(resolved.descriptor, parameters)
            && !parameters.contains_key(&descriptor.name)
        {
            issues.push(
                ValidationIssue::error(
                    IssueCode::ParameterValidationError,
                    format!("required parameter '{}' is missing", descriptor.name),
                )
                .at_parameter(descriptor.name.clone()),
            );
        }
    }
}

/// Enum membership plus numeric/string bounds for one resolved value.
fn check_value(
    descriptor: &ParameterDescriptor,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    // Expression strings are opaque patterns, never constraint-checked.
    if value.as_str().is_some_and(|s| s.starts_with('=')) {
        return;
    }

    match descriptor.kind {
        ParameterType::Options => {
            if let Some(allowed) = descriptor.enum_values() {
                if !allowed.iter().any(|a| loose_eq(a, value)) {
                    issues.push(enum_issue(path, value, &allowed));
                }
            }
        }
        ParameterType::MultiOptions => {
            if let Some(allowed) = descriptor.enum_values() {
                match value.as_array() {
                    Some(entries) => {
                        for entry in entries {
                            if entry.as_str().is_some_and(|s| s.starts_with('=')) {
                                continue;
                            }
                            if !allowed.iter().any(|a| loose_eq(a, entry)) {
                                issues.push(enum_issue(path, entry, &allowed));
                            }
                        }
                    }
                    None => issues.push(
                        ValidationIssue::error(
                            IssueCode::InvalidType,
                            format!("'{path}' must be an array of choices"),
                        )
                        .at_parameter(path.to_string())
                        .observed(value.clone()),
                    ),
                }
            }
        }
        _ => {}
    }

    if let Some(type_options) = &descriptor.type_options {
        check_bounds(type_options, value, path, issues);
    }
}

fn enum_issue(path: &str, observed: &Value, allowed: &[&Value]) -> ValidationIssue {
    ValidationIssue::error(
        IssueCode::ParameterValidationError,
        format!("'{path}' has a value outside its allowed set"),
    )
    .at_parameter(path.to_string())
    .observed(observed.clone())
    .expected(Value::Array(allowed.iter().map(|v| (*v).clone()).collect()))
}

fn check_bounds(
    type_options: &TypeOptions,
    value: &Value,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(number) = value.as_f64() {
        if let Some(min) = type_options.min_value {
            if number < min {
                issues.push(bound_issue(path, value, format!("must be >= {min}")));
            }
        }
        if let Some(max) = type_options.max_value {
            if number > max {
                issues.push(bound_issue(path, value, format!("must be <= {max}")));
            }
        }
        if let Some(step) = type_options.multiple_of {
            if step > 0.0 && ((number / step).round() * step - number).abs() > 1e-9 {
                issues.push(bound_issue(path, value, format!("must be a multiple of {step}")));
            }
        }
    }

    if let Some(text) = value.as_str() {
        let length = text.chars().count() as u64;
        if let Some(min) = type_options.min_length {
            if length < min {
                issues.push(bound_issue(path, value, format!("must be at least {min} characters")));
            }
        }
        if let Some(max) = type_options.max_length {
            if length > max {
                issues.push(bound_issue(path, value, format!("must be at most {max} characters")));
            }
        }
        if let Some(pattern) = &type_options.pattern {
            match regex::Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(text) {
                        issues.push(bound_issue(path, value, format!("must match /{pattern}/")));
                    }
                }
                Err(e) => {
                    tracing::debug!(parameter = %path, error = %e, "unusable schema pattern");
                }
            }
        }
    }
}

fn bound_issue(path: &str, observed: &Value, constraint: String) -> ValidationIssue {
    ValidationIssue::error(
        IssueCode::ParameterValidationError,
        format!("'{path}' {constraint}"),
    )
    .at_parameter(path.to_string())
    .observed(observed.clone())
}

/// Stage 5: submitted keys must be members of the collection's valid option
/// set; entry objects are checked against the option's extracted rules.
fn check_fixed_collection(
    field: &str,
    value: &Value,
    schema: &NodeSchema,
    policy: &ValidationPolicy,
    require_filter_version: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(collection) = schema.fixed_collections.get(field) else {
        return;
    };
    let Some(object) = value.as_object() else {
        issues.push(
            ValidationIssue::error(
                IssueCode::InvalidType,
                format!("'{field}' must be an object of sub-groups"),
            )
            .at_parameter(field.to_string())
            .observed(value.clone()),
        );
        return;
    };

    let valid = collection.valid_option_names();
    for (key, entries) in object {
        let Some(option) = collection.option(key) else {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidFixedCollectionKey,
                    format!("'{key}' is not a valid sub-group of '{field}'"),
                )
                .at_parameter(format!("{field}.{key}"))
                .expected(serde_json::json!(valid)),
            );
            continue;
        };

        match entries {
            Value::Array(list) => {
                for (i, entry) in list.iter().enumerate() {
                    check_group_entry(
                        entry,
                        option,
                        &format!("{field}.{key}[{i}]"),
                        policy,
                        require_filter_version,
                        issues,
                    );
                }
            }
            Value::Object(_) => check_group_entry(
                entries,
                option,
                &format!("{field}.{key}"),
                policy,
                require_filter_version,
                issues,
            ),
            other => issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidType,
                    format!("'{field}.{key}' must be an object or an array of objects"),
                )
                .at_parameter(format!("{field}.{key}"))
                .observed(other.clone()),
            ),
        }
    }
}

fn check_group_entry(
    entry: &Value,
    option: &FixedCollectionOption,
    path: &str,
    policy: &ValidationPolicy,
    require_filter_version: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(object) = entry.as_object() else {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidType, format!("'{path}' must be an object"))
                .at_parameter(path.to_string())
                .observed(entry.clone()),
        );
        return;
    };

    for rule in &option.rules {
        let nested_path = format!("{path}.{}", rule.name);
        match object.get(&rule.name) {
            None => {
                if rule.required {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::ParameterValidationError,
                            format!("required field '{}' is missing", rule.name),
                        )
                        .at_parameter(nested_path),
                    );
                }
            }
            Some(nested) => {
                if rule.kind == ParameterType::Filter {
                    filter::validate_filter(nested, &nested_path, require_filter_version, issues);
                } else if let Some(allowed) = &rule.enum_values {
                    let skip = nested.as_str().is_some_and(|s| s.starts_with('='));
                    if !skip && !allowed.iter().any(|a| loose_eq(a, nested)) {
                        let refs: Vec<&Value> = allowed.iter().collect();
                        issues.push(enum_issue(&nested_path, nested, &refs));
                    }
                }
            }
        }
    }

    for key in object.keys() {
        if !option.rules.iter().any(|r| r.name == *key) {
            issues.push(
                ValidationIssue {
                    severity: policy.unknown_parameter,
                    ..ValidationIssue::error(
                        IssueCode::ParameterIssue,
                        format!("'{path}.{key}' is not declared by this sub-group"),
                    )
                }
                .at_parameter(format!("{path}.{key}")),
            );
        }
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => a == b,
    }
}

/// Attach node identity to every issue that does not already carry one.
fn locate_all(issues: Vec<ValidationIssue>, node: &Value) -> Vec<ValidationIssue> {
    let name = workflow::node_name(node);
    let id = workflow::node_id(node);
    let node_type = workflow::node_type(node);
    issues
        .into_iter()
        .map(|mut issue| {
            if issue.location.node_name.is_none() {
                issue.location.node_name = name.map(str::to_string);
            }
            if issue.location.node_id.is_none() {
                issue.location.node_id = id.map(str::to_string);
            }
            if issue.location.node_type.is_none() {
                issue.location.node_type = node_type.map(str::to_string);
            }
            issue
        })
        .collect()
}
