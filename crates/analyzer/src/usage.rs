//! Step 1-3 of the cross-package analyzer: walk every pipeline's contained
//! operations and build shared-resource usage maps.

use etlgraph_core::{EdgeKind, GraphClient, GraphError, InMemoryGraph, Node, NodeKind};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default, Clone)]
pub struct TableUsage {
    pub reader_packages: HashSet<String>,
    pub writer_packages: HashSet<String>,
}

impl TableUsage {
    pub fn packages(&self) -> HashSet<String> {
        self.reader_packages.union(&self.writer_packages).cloned().collect()
    }
}

#[derive(Debug, Default)]
pub struct UsageMaps {
    pub table_usage: HashMap<String, TableUsage>,
    pub connection_usage: HashMap<String, HashSet<String>>,
    pub parameter_usage: HashMap<String, HashSet<String>>,
}

/// `contains` edges are emitted at whatever depth the source parser
/// produces them (nested SSIS containers can nest operations inside
/// operations), so descendants are collected by BFS rather than assumed to
/// be direct children of the pipeline.
fn collect_operations(graph: &InMemoryGraph, root_id: &str) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack = vec![root_id.to_string()];
    while let Some(id) = stack.pop() {
        for (_, child) in graph.edges_from_by_relation(&id, EdgeKind::Contains) {
            if child.kind == NodeKind::Operation {
                stack.push(child.id.clone());
                out.push(child);
            }
        }
    }
    out
}

/// Connection/parameter usage is attached at either the pipeline node
/// itself (the common SSIS case: a package's own connection managers) or at
/// an individual operation (an expression referencing a parameter); both are
/// collected so shared-resource detection sees the full picture.
pub async fn build_usage_maps(graph: &InMemoryGraph) -> Result<UsageMaps, GraphError> {
    let pipelines = graph.get_nodes_by_kind(NodeKind::Pipeline).await?;
    let mut maps = UsageMaps::default();

    for pipeline in &pipelines {
        let pkg = pipeline.id.clone();
        let operations = collect_operations(graph, &pipeline.id);

        record_resource_usage(graph, &pkg, &pipeline.id, &mut maps.connection_usage, EdgeKind::UsesConnection);
        record_resource_usage(graph, &pkg, &pipeline.id, &mut maps.parameter_usage, EdgeKind::UsesParameter);

        for op in &operations {
            for (_, table) in graph.edges_from_by_relation(&op.id, EdgeKind::ReadsFrom) {
                maps.table_usage
                    .entry(table.id.clone())
                    .or_default()
                    .reader_packages
                    .insert(pkg.clone());
            }
            for (_, table) in graph.edges_from_by_relation(&op.id, EdgeKind::WritesTo) {
                maps.table_usage
                    .entry(table.id.clone())
                    .or_default()
                    .writer_packages
                    .insert(pkg.clone());
            }
            record_resource_usage(graph, &pkg, &op.id, &mut maps.connection_usage, EdgeKind::UsesConnection);
            record_resource_usage(graph, &pkg, &op.id, &mut maps.parameter_usage, EdgeKind::UsesParameter);
        }
    }

    Ok(maps)
}

fn record_resource_usage(
    graph: &InMemoryGraph,
    package_id: &str,
    from_id: &str,
    usage: &mut HashMap<String, HashSet<String>>,
    relation: EdgeKind,
) {
    for (_, resource) in graph.edges_from_by_relation(from_id, relation) {
        usage.entry(resource.id).or_default().insert(package_id.to_string());
    }
}
