//! Default-value evaluation.
//!
//! Computes the flattened value tree obtained by evaluating every descriptor
//! that is visible under the empty context. Deterministic and side-effect
//! free: the same descriptor list always yields the same tree.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::{DescriptorOption, ParameterDescriptor, ParameterType};
use crate::resolve;

#[derive(Debug, Clone, Error)]
pub enum DefaultsError {
    #[error("fixedCollection '{0}' declares no sub-groups")]
    MissingNestedShape(String),
    #[error("fixedCollection '{field}' option '{option}' is not a sub-group")]
    NotAGroup { field: String, option: String },
}

/// Evaluate defaults for a descriptor list.
///
/// Callers degrade the whole node's defaults to `{}` when this fails; sibling
/// nodes are unaffected.
pub fn computed_defaults(
    properties: &[ParameterDescriptor],
) -> Result<Map<String, Value>, DefaultsError> {
    let empty = Map::new();
    let mut out = Map::new();

    for descriptor in properties {
        if !resolve::is_visible(descriptor, &empty) {
            continue;
        }
        match descriptor.kind {
            ParameterType::FixedCollection => {
                if let Some(value) = fixed_collection_default(descriptor)? {
                    out.insert(descriptor.name.clone(), value);
                }
            }
            ParameterType::Collection => {
                if let Some(value) = collection_default(descriptor)? {
                    out.insert(descriptor.name.clone(), value);
                }
            }
            _ => {
                if let Some(default) = &descriptor.default {
                    out.insert(descriptor.name.clone(), default.clone());
                }
            }
        }
    }

    Ok(out)
}

/// An explicit default wins; otherwise recurse into each sub-group's own
/// descriptor list and keep the groups that contribute anything.
fn fixed_collection_default(
    descriptor: &ParameterDescriptor,
) -> Result<Option<Value>, DefaultsError> {
    if let Some(default) = &descriptor.default {
        return Ok(Some(default.clone()));
    }

    let Some(options) = &descriptor.options else {
        return Err(DefaultsError::MissingNestedShape(descriptor.name.clone()));
    };

    let mut object = Map::new();
    for option in options {
        match option {
            DescriptorOption::Group(group) => {
                let nested = computed_defaults(&group.values)?;
                if !nested.is_empty() {
                    object.insert(group.name.clone(), Value::Object(nested));
                }
            }
            DescriptorOption::Choice(choice) => {
                return Err(DefaultsError::NotAGroup {
                    field: descriptor.name.clone(),
                    option: choice.name.clone(),
                });
            }
            DescriptorOption::Nested(nested) => {
                return Err(DefaultsError::NotAGroup {
                    field: descriptor.name.clone(),
                    option: nested.name.clone(),
                });
            }
        }
    }

    if object.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Value::Object(object)))
    }
}

fn collection_default(descriptor: &ParameterDescriptor) -> Result<Option<Value>, DefaultsError> {
    if let Some(default) = &descriptor.default {
        return Ok(Some(default.clone()));
    }

    let nested: Vec<ParameterDescriptor> = descriptor.nested_descriptors().cloned().collect();
    if nested.is_empty() {
        return Ok(None);
    }
    let object = computed_defaults(&nested)?;
    if object.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Value::Object(object)))
    }
}
