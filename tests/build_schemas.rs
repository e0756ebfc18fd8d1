//! Integration tests for schema extraction over realistic descriptor sets.

mod helpers;

use flowschema::descriptor::ParameterType;

#[test]
fn extraction_covers_every_provider_entry() {
    let extraction = helpers::sample_extraction();
    assert_eq!(extraction.schemas.len(), 2);
    assert_eq!(extraction.credentials.len(), 1);
    assert_eq!(extraction.credentials[0].name, "slackApi");
    assert!(extraction.skipped.is_empty());
}

#[test]
fn unversioned_node_gets_version_one() {
    let schemas = helpers::sample_schemas();
    let slack = schemas.get("n8n-nodes-base.slack").unwrap();
    assert_eq!(slack.version, 1.0);
    assert_eq!(slack.available_versions, vec![1.0]);
    assert!(slack.schema_warnings.is_empty());
}

#[test]
fn versioned_node_resolves_to_highest() {
    let schemas = helpers::sample_schemas();
    let switch = schemas.get("n8n-nodes-base.switch").unwrap();
    assert_eq!(switch.version, 3.2);
    assert_eq!(switch.available_versions, vec![2.0, 3.2]);
    assert!(switch.supports_version(2.0));
    assert!(!switch.supports_version(1.0));
    // The resolved descriptor set is the 3.2 one.
    assert!(switch.properties.iter().any(|d| d.name == "rules"));
    assert!(!switch.properties.iter().any(|d| d.name == "dataType"));
}

#[test]
fn resource_operation_table_follows_display_gating() {
    let schemas = helpers::sample_schemas();
    let slack = schemas.get("n8n-nodes-base.slack").unwrap();

    let message = &slack.resource_operations["message"];
    assert_eq!(message.operations, vec!["post".to_string(), "update".to_string()]);
    assert_eq!(
        message.fields["post"],
        vec!["channel".to_string(), "text".to_string()]
    );
    assert_eq!(message.fields["update"], vec!["text".to_string()]);

    let channel = &slack.resource_operations["channel"];
    assert_eq!(channel.operations, vec!["create".to_string()]);
    assert_eq!(channel.fields["create"], vec!["channelName".to_string()]);
}

#[test]
fn fixed_collection_rules_extracted_one_level() {
    let schemas = helpers::sample_schemas();
    let slack = schemas.get("n8n-nodes-base.slack").unwrap();

    let attachments = &slack.fixed_collections["attachments"];
    assert_eq!(attachments.valid_option_names(), vec!["attachment"]);
    let rules = &attachments.option("attachment").unwrap().rules;
    assert_eq!(rules[0].name, "title");
    assert!(rules[0].required);
    assert_eq!(rules[1].name, "color");
    assert!(!rules[1].required);
    assert_eq!(rules[1].kind, ParameterType::Options);
    assert_eq!(rules[1].enum_values.as_ref().unwrap().len(), 3);
}

#[test]
fn nested_filter_is_a_collection_rule_not_a_filter_field() {
    let schemas = helpers::sample_schemas();
    let switch = schemas.get("n8n-nodes-base.switch").unwrap();

    assert!(switch.filter_fields.is_empty());
    let rules = &switch.fixed_collections["rules"].option("values").unwrap().rules;
    assert!(
        rules
            .iter()
            .any(|r| r.name == "conditions" && r.kind == ParameterType::Filter)
    );
}

#[test]
fn computed_defaults_cover_defaulted_visible_fields() {
    let schemas = helpers::sample_schemas();
    let slack = schemas.get("n8n-nodes-base.slack").unwrap();
    assert_eq!(
        slack.computed_defaults.get("resource"),
        Some(&serde_json::json!("message"))
    );
    assert_eq!(
        slack.computed_defaults.get("attachments"),
        Some(&serde_json::json!({}))
    );
    // No default declared, so no entry.
    assert!(!slack.computed_defaults.contains_key("channel"));
}

#[test]
fn extraction_is_idempotent() {
    let first = helpers::sample_extraction();
    let second = helpers::sample_extraction();
    for (name, schema) in first.schemas.iter() {
        assert_eq!(Some(schema), second.schemas.get(name));
    }
    assert_eq!(first.schemas.len(), second.schemas.len());
}
