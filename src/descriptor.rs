//! Serde types for raw plugin parameter descriptors.
//!
//! These mirror the descriptor objects a plugin package declares for each of
//! its parameters. Deserialization is permissive: unknown parameter types fall
//! back to [`ParameterType::Unknown`] instead of failing the whole list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The fixed enumeration of declared parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Json,
    Options,
    MultiOptions,
    Collection,
    FixedCollection,
    Filter,
    ResourceLocator,
    ResourceMapper,
    AssignmentCollection,
    Credentials,
    CredentialsSelect,
    Color,
    DateTime,
    Notice,
    Hidden,
    Button,
    Callout,
    #[serde(other)]
    Unknown,
}

/// Numeric and string bounds attached to a descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Whether the field holds a list of values rather than a single one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_values: Option<bool>,
}

/// The show/hide visibility predicate gating a descriptor on sibling values.
///
/// Each map entry names a sibling field and the value set that must match
/// (`show`) or must not match (`hide`) for the descriptor to be active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<BTreeMap<String, Vec<Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide: Option<BTreeMap<String, Vec<Value>>>,
}

impl DisplayOptions {
    /// Names of the sibling fields this predicate reads.
    pub fn gating_keys(&self) -> impl Iterator<Item = &str> {
        self.show
            .iter()
            .flat_map(|m| m.keys())
            .chain(self.hide.iter().flat_map(|m| m.keys()))
            .map(String::as_str)
    }
}

/// One entry of a descriptor's `options` list.
///
/// The list is heterogeneous depending on the declaring type: enumerated
/// choices for options/multiOptions, nested sub-groups for fixedCollection,
/// and full sub-descriptors for collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorOption {
    /// A fixedCollection sub-group: `{ name, values: [descriptors…] }`.
    Group(OptionGroup),
    /// A collection sub-descriptor (a full descriptor of its own).
    Nested(ParameterDescriptor),
    /// An enumerated choice: `{ name, value }`.
    Choice(OptionChoice),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub values: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChoice {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One declared field on a node or credential.
///
/// `name` is unique within its declaring scope except when the same logical
/// parameter is declared several times under different display contexts; such
/// duplicates are kept side by side and disambiguated at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<DescriptorOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    /// Explicit override. Absent means "required iff no default and no
    /// display options".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl ParameterDescriptor {
    /// The enumerated values this descriptor admits, if it is an
    /// options/multiOptions field with choice entries.
    pub fn enum_values(&self) -> Option<Vec<&Value>> {
        let options = self.options.as_ref()?;
        let values: Vec<&Value> = options
            .iter()
            .filter_map(|o| match o {
                DescriptorOption::Choice(c) => Some(&c.value),
                _ => None,
            })
            .collect();
        if values.is_empty() { None } else { Some(values) }
    }

    /// The nested sub-groups, if this is a fixedCollection descriptor.
    pub fn option_groups(&self) -> impl Iterator<Item = &OptionGroup> {
        self.options.iter().flatten().filter_map(|o| match o {
            DescriptorOption::Group(g) => Some(g),
            _ => None,
        })
    }

    /// The nested sub-descriptors, if this is a collection descriptor.
    pub fn nested_descriptors(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.options.iter().flatten().filter_map(|o| match o {
            DescriptorOption::Nested(d) => Some(d),
            _ => None,
        })
    }
}
