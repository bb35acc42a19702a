//! etlgraph-analyzer — cross-package dependency analysis (C8).
//!
//! Builds shared-resource usage maps from an already-ingested graph, derives
//! `depends_on`/`shares_resource` edges from them, computes a cycle-tolerant
//! topological leveling of pipelines, writes both the new edges and
//! per-pipeline annotations back into the graph, and returns a summary report.

pub mod dependencies;
pub mod ordering;
pub mod report;
pub mod usage;

use etlgraph_core::{GraphClient, GraphError, InMemoryGraph, Node, NodeKind};
use report::Report;
use serde_json::json;

pub async fn analyze(graph: &InMemoryGraph) -> Result<Report, GraphError> {
    let maps = usage::build_usage_maps(graph).await?;
    let deps = dependencies::compute_dependencies(&maps);

    let pipelines = graph.get_nodes_by_kind(NodeKind::Pipeline).await?;
    let pipeline_ids: Vec<String> = pipelines.iter().map(|p| p.id.clone()).collect();
    let ordering = ordering::compute_levels(&pipeline_ids, &deps.upstream);

    annotate_pipelines(graph, &pipelines, &deps, &ordering).await?;

    graph.add_edges(deps.depends_on_edges.clone()).await?;
    graph.add_edges(deps.shares_resource_edges.clone()).await?;

    let mut high_risk_resources = deps.high_risk_connections.clone();
    high_risk_resources.sort();

    Ok(Report {
        pipelines_analyzed: pipelines.len(),
        depends_on_edges_written: deps.depends_on_edges.len(),
        shares_resource_edges_written: deps.shares_resource_edges.len(),
        execution_order: ordering.execution_order().into_iter().map(|s| s.to_string()).collect(),
        cycle_detected: ordering.cycle_detected,
        high_risk_tables: deps.high_risk_tables,
        high_risk_resources,
    })
}

async fn annotate_pipelines(
    graph: &InMemoryGraph,
    pipelines: &[Node],
    deps: &dependencies::DependencyResult,
    ordering: &ordering::OrderingResult,
) -> Result<(), GraphError> {
    let mut downstream: std::collections::HashMap<&str, Vec<&str>> = std::collections::HashMap::new();
    for (pipeline, upstream_set) in &deps.upstream {
        for up in upstream_set {
            downstream.entry(up.as_str()).or_default().push(pipeline.as_str());
        }
    }

    for pipeline in pipelines {
        let upstream_deps: Vec<&str> = deps
            .upstream
            .get(&pipeline.id)
            .map(|s| s.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default();
        let downstream_deps: Vec<&str> = downstream.get(pipeline.id.as_str()).cloned().unwrap_or_default();

        let shared_tables: Vec<&str> = [&deps.high_risk_tables]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .collect();

        let annotation = Node::new(pipeline.id.clone(), NodeKind::Pipeline, pipeline.name.clone())
            .with_property(
                "execution_priority",
                json!(ordering.priority_of(&pipeline.id).unwrap_or(usize::MAX)),
            )
            .with_property("upstream_dependencies", json!(upstream_deps))
            .with_property("downstream_dependencies", json!(downstream_deps))
            .with_property("shared_tables_used", json!(shared_tables))
            .with_property("shared_connections_used", json!(deps.high_risk_connections))
            .with_property("cross_package_analysis_complete", json!(true));

        graph.write_node(annotation).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use etlgraph_core::{Edge, EdgeKind};

    async fn seed_two_package_graph() -> InMemoryGraph {
        let g = InMemoryGraph::new();
        g.add_nodes(vec![
            Node::new("pipeline:Load", NodeKind::Pipeline, "Load"),
            Node::new("pipeline:Report", NodeKind::Pipeline, "Report"),
            Node::new("operation:Load/Write", NodeKind::Operation, "Write"),
            Node::new("operation:Report/Read", NodeKind::Operation, "Read"),
            Node::new("table:CUSTOMERS", NodeKind::Table, "CUSTOMERS"),
        ])
        .await
        .unwrap();
        g.add_edges(vec![
            Edge::new("pipeline:Load", "operation:Load/Write", EdgeKind::Contains),
            Edge::new("pipeline:Report", "operation:Report/Read", EdgeKind::Contains),
            Edge::new("operation:Load/Write", "table:CUSTOMERS", EdgeKind::WritesTo),
            Edge::new("operation:Report/Read", "table:CUSTOMERS", EdgeKind::ReadsFrom),
        ])
        .await
        .unwrap();
        g
    }

    #[tokio::test]
    async fn analyze_emits_depends_on_edge_and_annotates_pipelines() {
        let g = seed_two_package_graph().await;
        let report = analyze(&g).await.unwrap();

        assert_eq!(report.pipelines_analyzed, 2);
        assert_eq!(report.depends_on_edges_written, 1);
        assert!(!report.cycle_detected);

        let deps = g.edges_from_by_relation("pipeline:Report", EdgeKind::DependsOn);
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].1.id, "pipeline:Load");

        let report_node = g.get_node("pipeline:Report").await.unwrap().unwrap();
        assert_eq!(report_node.get_property("cross_package_analysis_complete").unwrap(), true);
    }

    #[tokio::test]
    async fn analyze_on_empty_graph_is_a_no_op() {
        let g = InMemoryGraph::new();
        let report = analyze(&g).await.unwrap();
        assert_eq!(report.pipelines_analyzed, 0);
        assert_eq!(report.depends_on_edges_written, 0);
        assert!(report.execution_order.is_empty());
    }
}
