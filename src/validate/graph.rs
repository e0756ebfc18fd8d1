//! Connection-graph integrity checks.
//!
//! A petgraph-backed wrapper over the document's `connections` map. Dangling
//! source keys and dangling target references are distinct issue kinds; both
//! directions are validated.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{Map, Value};

use crate::error::{IssueCode, ValidationIssue};
use crate::workflow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionEdge {
    /// Output-slot kind, e.g. `main`.
    pub kind: String,
    pub output_index: usize,
}

pub struct ConnectionGraph {
    pub graph: DiGraph<String, ConnectionEdge>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl ConnectionGraph {
    /// Build the graph from the node name set and the raw connections map,
    /// accumulating integrity issues along the way.
    pub fn build(
        names: &[String],
        connections: &Map<String, Value>,
    ) -> (Self, Vec<ValidationIssue>) {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut issues = Vec::new();

        for name in names {
            if !node_indices.contains_key(name) {
                let idx = graph.add_node(name.clone());
                node_indices.insert(name.clone(), idx);
            }
        }

        for (source, slots) in connections {
            let source_idx = node_indices.get(source).copied();
            if source_idx.is_none() {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::DanglingConnectionSource,
                        format!("connection source '{source}' does not match any node"),
                    )
                    .for_node(source.clone()),
                );
            }

            let Some(slots) = slots.as_object() else {
                issues.push(
                    ValidationIssue::error(
                        IssueCode::InvalidType,
                        format!("connections for '{source}' must be an object of output slots"),
                    )
                    .for_node(source.clone())
                    .observed(slots.clone()),
                );
                continue;
            };

            for (kind, groups) in slots {
                let Some(groups) = groups.as_array() else {
                    issues.push(
                        ValidationIssue::error(
                            IssueCode::InvalidType,
                            format!("output slot '{source}.{kind}' must be an array of edge lists"),
                        )
                        .for_node(source.clone())
                        .observed(groups.clone()),
                    );
                    continue;
                };
                for (output_index, group) in groups.iter().enumerate() {
                    let Some(edges) = group.as_array() else {
                        issues.push(
                            ValidationIssue::error(
                                IssueCode::InvalidType,
                                format!(
                                    "output slot '{source}.{kind}[{output_index}]' must be an edge list"
                                ),
                            )
                            .for_node(source.clone())
                            .observed(group.clone()),
                        );
                        continue;
                    };
                    for edge in edges {
                        let Some(target) = edge.get("node").and_then(Value::as_str) else {
                            issues.push(
                                ValidationIssue::error(
                                    IssueCode::InvalidType,
                                    format!(
                                        "edge in '{source}.{kind}[{output_index}]' is missing a string 'node'"
                                    ),
                                )
                                .for_node(source.clone())
                                .observed(edge.clone()),
                            );
                            continue;
                        };

                        match (source_idx, node_indices.get(target)) {
                            (Some(s), Some(&t)) => {
                                graph.add_edge(
                                    s,
                                    t,
                                    ConnectionEdge {
                                        kind: kind.clone(),
                                        output_index,
                                    },
                                );
                            }
                            (_, None) => {
                                issues.push(
                                    ValidationIssue::error(
                                        IssueCode::DanglingConnectionTarget,
                                        format!(
                                            "edge from '{source}' targets unknown node '{target}'"
                                        ),
                                    )
                                    .for_node(source.clone())
                                    .observed(Value::String(target.to_string())),
                                );
                            }
                            (None, Some(_)) => {}
                        }
                    }
                }
            }
        }

        (Self { graph, node_indices }, issues)
    }

    /// Names of nodes with no incoming and no outgoing edges.
    pub fn isolated_nodes(&self) -> Vec<&str> {
        let mut isolated: Vec<&str> = self
            .node_indices
            .iter()
            .filter(|&(_, &idx)| self.graph.neighbors_undirected(idx).next().is_none())
            .map(|(name, _)| name.as_str())
            .collect();
        isolated.sort_unstable();
        isolated
    }
}

/// Run all connection checks for a document.
pub fn validate_connections(
    nodes: &[Value],
    connections: &Map<String, Value>,
    issues: &mut Vec<ValidationIssue>,
) {
    let names: Vec<String> = nodes
        .iter()
        .filter_map(workflow::node_name)
        .map(str::to_string)
        .collect();

    let (graph, mut connection_issues) = ConnectionGraph::build(&names, connections);
    issues.append(&mut connection_issues);

    // A node that takes no part in any edge is suspicious in a multi-node
    // document, but only once the document declares connections at all.
    if names.len() > 1 && !connections.is_empty() {
        for name in graph.isolated_nodes() {
            issues.push(
                ValidationIssue::warning(
                    IssueCode::IsolatedNode,
                    format!("node '{name}' has no incoming or outgoing connections"),
                )
                .for_node(name.to_string()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn connections(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn dangling_target_named() {
        let conns = connections(json!({
            "A": { "main": [[{ "node": "B", "type": "main", "index": 0 }]] }
        }));
        let (_, issues) = ConnectionGraph::build(&names(&["A"]), &conns);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::DanglingConnectionTarget);
        assert!(issues[0].message.contains("'B'"));
    }

    #[test]
    fn dangling_source_named() {
        let conns = connections(json!({
            "A": { "main": [[{ "node": "B", "type": "main", "index": 0 }]] }
        }));
        let (_, issues) = ConnectionGraph::build(&names(&["B"]), &conns);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::DanglingConnectionSource);
        assert!(issues[0].message.contains("'A'"));
    }

    #[test]
    fn valid_edge_builds_graph() {
        let conns = connections(json!({
            "A": { "main": [[{ "node": "B", "type": "main", "index": 0 }]] }
        }));
        let (graph, issues) = ConnectionGraph::build(&names(&["A", "B"]), &conns);
        assert!(issues.is_empty());
        assert_eq!(graph.graph.edge_count(), 1);
        assert!(graph.isolated_nodes().is_empty());
    }

    #[test]
    fn isolated_node_detected() {
        let conns = connections(json!({
            "A": { "main": [[{ "node": "B", "type": "main", "index": 0 }]] }
        }));
        let (graph, _) = ConnectionGraph::build(&names(&["A", "B", "C"]), &conns);
        assert_eq!(graph.isolated_nodes(), vec!["C"]);
    }

    #[test]
    fn malformed_edge_shape_reported() {
        let conns = connections(json!({
            "A": { "main": [[{ "type": "main", "index": 0 }]] }
        }));
        let (_, issues) = ConnectionGraph::build(&names(&["A"]), &conns);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidType);
    }
}
