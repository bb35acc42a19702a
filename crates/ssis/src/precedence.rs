//! `DTS:PrecedenceConstraint` → `precedes` edges (C4 step 5, Scenario C).

use crate::xmltree::XmlElement;
use etlgraph_core::{Edge, EdgeKind};
use std::collections::HashMap;

/// Builds `precedes` edges from every `DTS:PrecedenceConstraint` under
/// `package`, resolving `From`/`To` executable paths through `path_to_id`.
/// A constraint whose endpoint cannot be resolved is dropped with a debug
/// log line, matching the documented `MissingEndpoint` behavior.
pub fn extract_precedence_edges(package: &XmlElement, path_to_id: &HashMap<String, String>) -> Vec<Edge> {
    let mut edges = Vec::new();

    let mut constraints = Vec::new();
    package.find_all_descendants("PrecedenceConstraint", &mut constraints);

    for constraint in constraints {
        let from = constraint.attr("DTS:From").or_else(|| constraint.attr("From"));
        let to = constraint.attr("DTS:To").or_else(|| constraint.attr("To"));
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };

        match (path_to_id.get(from), path_to_id.get(to)) {
            (Some(from_id), Some(to_id)) => {
                edges.push(Edge::new(from_id.clone(), to_id.clone(), EdgeKind::Precedes));
            }
            _ => {
                tracing::debug!(from, to, "precedence constraint endpoint not found, dropping edge");
            }
        }
    }

    edges
}
