//! Structural validation of filter-typed values.
//!
//! The filter shape is fixed and node-independent: a top-level `options`
//! object (`caseSensitive`, `leftValue`, `typeValidation`), a `conditions`
//! array of `{leftValue, rightValue, operator: {type, operation}}`, and a
//! `combinator` of `and`/`or`. Nodes at typeVersion 3.2 and later
//! additionally require a `version` key inside `options`.

use serde_json::Value;

use crate::error::{IssueCode, ValidationIssue};

const COMBINATORS: [&str; 2] = ["and", "or"];
const TYPE_VALIDATION_MODES: [&str; 2] = ["strict", "loose"];

/// Validate one filter value. `path` is the dotted parameter path of the
/// field holding the value; `require_version` reflects the node's
/// typeVersion.
pub fn validate_filter(
    value: &Value,
    path: &str,
    require_version: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(object) = value.as_object() else {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "filter value must be an object")
                .at_parameter(path)
                .observed(value.clone()),
        );
        return;
    };

    // Each of the three members is checked independently so a missing
    // `options` never masks findings on `conditions` or `combinator`.
    match object.get("options") {
        None => issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                "filter is missing its 'options' object",
            )
            .at_parameter(format!("{path}.options")),
        ),
        Some(options) => validate_options(options, path, require_version, issues),
    }

    match object.get("conditions") {
        None => issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                "filter is missing its 'conditions' array",
            )
            .at_parameter(format!("{path}.conditions")),
        ),
        Some(Value::Array(conditions)) => {
            for (i, condition) in conditions.iter().enumerate() {
                validate_condition(condition, &format!("{path}.conditions[{i}]"), issues);
            }
        }
        Some(other) => issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "'conditions' must be an array")
                .at_parameter(format!("{path}.conditions"))
                .observed(other.clone()),
        ),
    }

    match object.get("combinator").and_then(Value::as_str) {
        Some(combinator) if COMBINATORS.contains(&combinator) => {}
        Some(combinator) => issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                format!("combinator '{combinator}' is not one of and/or"),
            )
            .at_parameter(format!("{path}.combinator"))
            .expected(serde_json::json!(COMBINATORS)),
        ),
        None => issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                "filter is missing its 'combinator' (and/or)",
            )
            .at_parameter(format!("{path}.combinator")),
        ),
    }
}

fn validate_options(
    options: &Value,
    path: &str,
    require_version: bool,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(object) = options.as_object() else {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "'options' must be an object")
                .at_parameter(format!("{path}.options"))
                .observed(options.clone()),
        );
        return;
    };

    for key in ["caseSensitive", "leftValue", "typeValidation"] {
        if !object.contains_key(key) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidFilterShape,
                    format!("filter options are missing '{key}'"),
                )
                .at_parameter(format!("{path}.options.{key}")),
            );
        }
    }

    if let Some(mode) = object.get("typeValidation").and_then(Value::as_str) {
        if !TYPE_VALIDATION_MODES.contains(&mode) {
            issues.push(
                ValidationIssue::error(
                    IssueCode::InvalidFilterShape,
                    format!("typeValidation '{mode}' is not one of strict/loose"),
                )
                .at_parameter(format!("{path}.options.typeValidation"))
                .expected(serde_json::json!(TYPE_VALIDATION_MODES)),
            );
        }
    }

    if require_version && !object.contains_key("version") {
        issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                "filter options require a 'version' key at typeVersion >= 3.2",
            )
            .at_parameter(format!("{path}.options.version")),
        );
    }
}

fn validate_condition(condition: &Value, path: &str, issues: &mut Vec<ValidationIssue>) {
    let Some(object) = condition.as_object() else {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "condition must be an object")
                .at_parameter(path)
                .observed(condition.clone()),
        );
        return;
    };

    if !object.contains_key("leftValue") {
        issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "condition is missing 'leftValue'")
                .at_parameter(format!("{path}.leftValue")),
        );
    }

    match object.get("operator") {
        Some(Value::Object(operator)) => {
            for key in ["type", "operation"] {
                if !operator.get(key).is_some_and(Value::is_string) {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::InvalidFilterShape,
                            format!("condition operator is missing string '{key}'"),
                        )
                        .at_parameter(format!("{path}.operator.{key}")),
                    );
                }
            }
        }
        Some(other) => issues.push(
            ValidationIssue::error(
                IssueCode::InvalidFilterShape,
                "condition 'operator' must be an object",
            )
            .at_parameter(format!("{path}.operator"))
            .observed(other.clone()),
        ),
        None => issues.push(
            ValidationIssue::error(IssueCode::InvalidFilterShape, "condition is missing 'operator'")
                .at_parameter(format!("{path}.operator")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(value: Value, require_version: bool) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        validate_filter(&value, "conditions", require_version, &mut issues);
        issues
    }

    fn valid_filter() -> Value {
        json!({
            "options": {
                "caseSensitive": true,
                "leftValue": "",
                "typeValidation": "strict"
            },
            "conditions": [{
                "leftValue": "={{ $json.status }}",
                "rightValue": "active",
                "operator": { "type": "string", "operation": "equals" }
            }],
            "combinator": "and"
        })
    }

    #[test]
    fn valid_filter_passes() {
        assert!(run(valid_filter(), false).is_empty());
    }

    #[test]
    fn missing_options_is_exactly_one_issue_at_that_path() {
        let mut value = valid_filter();
        value.as_object_mut().unwrap().remove("options");
        let issues = run(value, false);
        let about_options: Vec<_> = issues
            .iter()
            .filter(|i| i.location.parameter.as_deref() == Some("conditions.options"))
            .collect();
        assert_eq!(about_options.len(), 1);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn missing_options_reported_regardless_of_other_faults() {
        let issues = run(json!({ "conditions": [], "combinator": "neither" }), false);
        assert!(
            issues
                .iter()
                .any(|i| i.location.parameter.as_deref() == Some("conditions.options"))
        );
        assert!(
            issues
                .iter()
                .any(|i| i.location.parameter.as_deref() == Some("conditions.combinator"))
        );
    }

    #[test]
    fn version_required_at_3_2() {
        let issues = run(valid_filter(), true);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].location.parameter.as_deref(),
            Some("conditions.options.version")
        );

        let mut value = valid_filter();
        value["options"]["version"] = json!(2);
        let mut issues = Vec::new();
        validate_filter(&value, "conditions", true, &mut issues);
        assert!(issues.is_empty());
    }

    #[test]
    fn loose_type_validation_accepted_strict_enforced() {
        let mut value = valid_filter();
        value["options"]["typeValidation"] = json!("loose");
        assert!(run(value, false).is_empty());

        let mut value = valid_filter();
        value["options"]["typeValidation"] = json!("fuzzy");
        let issues = run(value, false);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn malformed_condition_operator() {
        let mut value = valid_filter();
        value["conditions"][0]["operator"] = json!("equals");
        let issues = run(value, false);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].location.parameter.as_deref(),
            Some("conditions.conditions[0].operator")
        );
    }
}
