//! Resource → operation → field map construction.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::descriptor::{DisplayOptions, ParameterDescriptor};
use crate::schema::ResourceOperations;

/// Build the per-resource operation table from a descriptor list.
///
/// Descriptors named exactly `resource` and `operation` drive the table. An
/// operation belongs to a resource value iff its own `show.resource` lists
/// that value, or it carries no display options at all (global operation). A
/// field belongs to a (resource, operation) pair iff its `show` lists both
/// the resource value under `resource` and the operation value under
/// `operation` — both conditions, not merely one.
pub fn resource_operations(
    properties: &[ParameterDescriptor],
) -> BTreeMap<String, ResourceOperations> {
    let mut table = BTreeMap::new();

    let resource_values: Vec<String> = properties
        .iter()
        .filter(|d| d.name == "resource")
        .flat_map(enum_strings)
        .collect();
    if resource_values.is_empty() {
        return table;
    }

    let operation_descriptors: Vec<&ParameterDescriptor> =
        properties.iter().filter(|d| d.name == "operation").collect();

    for resource in &resource_values {
        let mut operations: Vec<String> = Vec::new();
        for descriptor in &operation_descriptors {
            let applies = match &descriptor.display_options {
                None => true,
                Some(display) => show_lists(display, "resource", resource),
            };
            if applies {
                for op in enum_strings(descriptor) {
                    if !operations.contains(&op) {
                        operations.push(op);
                    }
                }
            }
        }

        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for op in &operations {
            let mut names: Vec<String> = Vec::new();
            for descriptor in properties {
                if descriptor.name == "resource" || descriptor.name == "operation" {
                    continue;
                }
                let Some(display) = &descriptor.display_options else {
                    continue;
                };
                if show_lists(display, "resource", resource) && show_lists(display, "operation", op)
                {
                    if !names.contains(&descriptor.name) {
                        names.push(descriptor.name.clone());
                    }
                }
            }
            fields.insert(op.clone(), names);
        }

        table.insert(
            resource.clone(),
            ResourceOperations { operations, fields },
        );
    }

    table
}

fn show_lists(display: &DisplayOptions, key: &str, value: &str) -> bool {
    display
        .show
        .as_ref()
        .and_then(|m| m.get(key))
        .is_some_and(|values| values.iter().any(|v| v.as_str() == Some(value)))
}

fn enum_strings(descriptor: &ParameterDescriptor) -> Vec<String> {
    descriptor
        .enum_values()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}
