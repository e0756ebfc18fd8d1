//! Nested constraint-tree extraction: fixedCollection sub-group rules.
//!
//! fixedCollection descriptors recurse exactly one level: each sub-group's
//! `values` list is run back through rule extraction. Filter descriptors do
//! not recurse — the filter shape is fixed and node-independent (see
//! `validate::filter`).

use std::collections::BTreeMap;

use crate::descriptor::{ParameterDescriptor, ParameterType};
use crate::schema::{FieldRule, FixedCollectionOption, FixedCollectionSchema};

/// Extract the fixedCollection shape table from a descriptor list.
pub fn fixed_collections(
    properties: &[ParameterDescriptor],
) -> BTreeMap<String, FixedCollectionSchema> {
    let mut table = BTreeMap::new();
    for descriptor in properties {
        if descriptor.kind != ParameterType::FixedCollection {
            continue;
        }
        let options: Vec<FixedCollectionOption> = descriptor
            .option_groups()
            .map(|group| FixedCollectionOption {
                name: group.name.clone(),
                rules: group.values.iter().map(field_rule).collect(),
            })
            .collect();
        table.insert(descriptor.name.clone(), FixedCollectionSchema { options });
    }
    table
}

/// Names of filter-typed fields in declaration order, deduplicated.
pub fn filter_fields(properties: &[ParameterDescriptor]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for descriptor in properties {
        if descriptor.kind == ParameterType::Filter && !names.contains(&descriptor.name) {
            names.push(descriptor.name.clone());
        }
    }
    names
}

fn field_rule(descriptor: &ParameterDescriptor) -> FieldRule {
    FieldRule {
        name: descriptor.name.clone(),
        kind: descriptor.kind,
        required: match descriptor.required {
            Some(explicit) => explicit,
            None => descriptor.default.is_none() && descriptor.display_options.is_none(),
        },
        enum_values: descriptor
            .enum_values()
            .map(|values| values.into_iter().cloned().collect()),
        type_options: descriptor.type_options.clone(),
    }
}
