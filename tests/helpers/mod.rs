#![allow(dead_code)]

use flowschema::provider::{CredentialDescription, NodeDescription, RawNodeType, StaticProvider};
use flowschema::schema::{Extraction, SchemaIndex, build_schemas};

fn description(json: &str) -> NodeDescription {
    serde_json::from_str(json).expect("fixture should deserialize")
}

/// A provider with an unversioned Slack node, a versioned Switch node
/// (2.0 and 3.2), and one credential type.
pub fn sample_provider() -> StaticProvider {
    let mut provider = StaticProvider::new();
    provider.insert_node(RawNodeType::Unversioned(description(include_str!(
        "../fixtures/slack_node.json"
    ))));
    provider.insert_node(RawNodeType::Versioned {
        default_version: None,
        versions: vec![
            (2.0, description(include_str!("../fixtures/switch_v2.json"))),
            (3.2, description(include_str!("../fixtures/switch_v3.json"))),
        ],
    });
    let credential: CredentialDescription =
        serde_json::from_str(include_str!("../fixtures/slack_credential.json"))
            .expect("fixture should deserialize");
    provider.insert_credential(credential);
    provider
}

pub fn sample_extraction() -> Extraction {
    build_schemas(&sample_provider())
}

pub fn sample_schemas() -> SchemaIndex {
    sample_extraction().schemas
}
