//! Conditional field resolution.
//!
//! Given a descriptor list and a concrete set of already-chosen sibling values
//! (the context), computes which fields are currently visible and which of
//! several same-named candidate declarations applies. Pure and repeatable: no
//! caching, required-ness is re-derived per call.

use serde_json::{Map, Value};

use crate::descriptor::ParameterDescriptor;

/// Loose equality used for display-option matching: numbers compare by value
/// so a `typeVersion` of `3` matches a declared `3.0`.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() < 1e-9,
        _ => a == b,
    }
}

fn value_in(candidates: &[Value], actual: &Value) -> bool {
    candidates.iter().any(|c| value_eq(c, actual))
}

/// Whether a descriptor is visible under the given context.
///
/// A `show` key whose value is absent from the context counts as "not yet
/// decided" and leaves the descriptor visible; a `hide` key only hides when
/// the context value is present and matches.
pub fn is_visible(descriptor: &ParameterDescriptor, context: &Map<String, Value>) -> bool {
    let Some(display) = &descriptor.display_options else {
        return true;
    };

    if let Some(show) = &display.show {
        for (key, allowed) in show {
            if let Some(actual) = context.get(key) {
                if !value_in(allowed, actual) {
                    return false;
                }
            }
        }
    }

    if let Some(hide) = &display.hide {
        for (key, blocked) in hide {
            if let Some(actual) = context.get(key) {
                if value_in(blocked, actual) {
                    return false;
                }
            }
        }
    }

    true
}

/// All descriptors visible under the context, in declaration order.
pub fn visible_fields<'a>(
    properties: &'a [ParameterDescriptor],
    context: &Map<String, Value>,
) -> Vec<&'a ParameterDescriptor> {
    properties
        .iter()
        .filter(|d| is_visible(d, context))
        .collect()
}

/// Whether a descriptor is required under the context: visible, and either
/// explicitly marked required or carrying no default.
pub fn is_required(descriptor: &ParameterDescriptor, context: &Map<String, Value>) -> bool {
    if !is_visible(descriptor, context) {
        return false;
    }
    match descriptor.required {
        Some(explicit) => explicit,
        None => descriptor.default.is_none(),
    }
}

/// The outcome of resolving one field name against its candidate declarations.
pub struct Resolved<'a> {
    pub descriptor: &'a ParameterDescriptor,
    /// More than one candidate stayed visible under a fully specified
    /// context. The last-declared one wins; callers report a warning.
    pub ambiguous: bool,
}

/// Resolve which of the same-named candidate descriptors applies under the
/// context. Returns `None` when no declaration with that name exists or none
/// is visible.
pub fn resolve_by_name<'a>(
    properties: &'a [ParameterDescriptor],
    name: &str,
    context: &Map<String, Value>,
) -> Option<Resolved<'a>> {
    let candidates: Vec<&ParameterDescriptor> =
        properties.iter().filter(|d| d.name == name).collect();
    if candidates.is_empty() {
        return None;
    }

    let visible: Vec<&ParameterDescriptor> = candidates
        .iter()
        .copied()
        .filter(|d| is_visible(d, context))
        .collect();

    let descriptor = *visible.last()?;
    let ambiguous = visible.len() > 1
        && visible
            .iter()
            .all(|d| gating_keys_specified(d, context));
    Some(Resolved {
        descriptor,
        ambiguous,
    })
}

/// Whether every sibling field this descriptor's predicate reads has a
/// concrete value in the context. Engine-provided keys (leading `@`) are
/// always considered specified.
fn gating_keys_specified(descriptor: &ParameterDescriptor, context: &Map<String, Value>) -> bool {
    let Some(display) = &descriptor.display_options else {
        return true;
    };
    display
        .gating_keys()
        .all(|key| key.starts_with('@') || context.contains_key(key))
}
