//! Instance validation: node-level and workflow-level.
//!
//! Validation never throws past this boundary. Every finding becomes an
//! accumulated [`ValidationIssue`](crate::error::ValidationIssue); callers
//! always receive the complete list of everything that could be checked.

pub mod filter;
pub mod graph;
pub mod node;
pub mod workflow;

pub use node::validate_node;
pub use workflow::validate_workflow;

use serde::Serialize;

use crate::error::{Severity, ValidationIssue};

/// Configurable validation behavior.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    /// Severity of a parameter key not declared by the node's schema.
    /// Defaults to warning; generator-facing callers may escalate to error
    /// since silently-ignored unknown fields usually indicate schema drift.
    pub unknown_parameter: Severity,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy {
            unknown_parameter: Severity::Warning,
        }
    }
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        ValidationPolicy {
            unknown_parameter: Severity::Error,
        }
    }
}

/// The validation response contract.
///
/// `errors` and `warnings` are flattened human-readable projections of
/// `issues`, kept for backward compatibility; `issues` is the structured
/// source of truth.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        let warnings = issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .map(ToString::to_string)
            .collect();
        ValidationOutcome {
            valid: errors.is_empty(),
            errors,
            warnings,
            issues,
        }
    }
}
