//! Join-relationship edges (C3). Column-alias edges are intentionally not
//! produced here: a column rarely exists as its own graph node, so wiring
//! edges to it would dangle.

use crate::semantics::SqlSemantics;
use etlgraph_core::{Edge, EdgeKind};
use serde_json::json;

/// Builds one [`Edge`] per join in `semantics`, connecting the tables it
/// relates. Ids are `table:<name>` to match the table nodes produced during
/// ingestion.
pub fn join_edges(semantics: &SqlSemantics) -> Vec<Edge> {
    semantics
        .joins
        .iter()
        .map(|join| {
            let source_id = format!("table:{}", join.left.name);
            let target_id = format!("table:{}", join.right.name);
            Edge::new(source_id, target_id, EdgeKind::References).with_property(
                "join_type",
                json!(join.kind.as_str()),
            )
            .with_property("condition", json!(join.condition))
            .with_property("left_alias", json!(join.left.alias))
            .with_property("right_alias", json!(join.right.alias))
            .with_property("raw_condition", json!(join.raw_condition))
            .with_property("relationship_type", json!("join_relationship"))
        })
        .collect()
}
