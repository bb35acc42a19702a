//! Graph-client contract (C6) and the in-memory directed-graph implementation.
//!
//! The contract is storage-agnostic: `etlgraph-remote` implements the same
//! trait against a Cypher-like backend. Consumers that need a generic view of
//! the graph should prefer [`GraphClient::get_all_nodes`]/[`GraphClient::get_all_edges`]
//! over reaching for a backend-specific handle.

use async_trait::async_trait;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::GraphError;
use crate::model::{Edge, EdgeKind, Node, NodeKind};

/// Storage-agnostic graph operations every backend must provide.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// MERGE-writes a node keyed by `id`; later property values win on conflict.
    async fn write_node(&self, node: Node) -> Result<(), GraphError>;

    /// Writes an edge. Endpoint-missing handling is backend-specific; see the
    /// implementation's own docs for which strategy it follows.
    async fn write_edge(&self, edge: Edge) -> Result<(), GraphError>;

    /// Batch form of [`GraphClient::write_node`]. Preserves input order so
    /// callers can rely on container-before-content ordering.
    async fn add_nodes(&self, nodes: Vec<Node>) -> Result<(), GraphError> {
        for node in nodes {
            self.write_node(node).await?;
        }
        Ok(())
    }

    /// Batch form of [`GraphClient::write_edge`].
    async fn add_edges(&self, edges: Vec<Edge>) -> Result<(), GraphError> {
        for edge in edges {
            self.write_edge(edge).await?;
        }
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError>;
    async fn get_all_nodes(&self) -> Result<Vec<Node>, GraphError>;
    async fn get_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>, GraphError>;
    async fn get_all_edges(&self) -> Result<Vec<Edge>, GraphError>;
    async fn get_node_count(&self) -> Result<usize, GraphError>;
    async fn get_edge_count(&self) -> Result<usize, GraphError>;

    /// Drops every node and edge. Used only by the CLI's `clear` subcommand.
    async fn clear_graph(&self) -> Result<(), GraphError>;
}

/// In-memory directed-graph backend (`O(1)` node lookup, `O(out-degree)` edge
/// lookup via `petgraph::StableDiGraph`).
///
/// Per the graph-client contract, `write_edge` here fails with
/// [`GraphError::MissingEndpoint`] when either endpoint is absent — this
/// implementation enforces the invariant eagerly rather than accepting the
/// write asynchronously, unlike the remote backend.
pub struct InMemoryGraph {
    inner: RwLock<Inner>,
}

struct Inner {
    graph: StableDiGraph<Node, Edge>,
    index: HashMap<String, NodeIndex>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        InMemoryGraph {
            inner: RwLock::new(Inner {
                graph: StableDiGraph::new(),
                index: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for InMemoryGraph {
    async fn write_node(&self, node: Node) -> Result<(), GraphError> {
        let mut inner = self.inner.write().unwrap();
        if let Some(&idx) = inner.index.get(&node.id) {
            let existing = inner.graph.node_weight_mut(idx).expect("indexed node present");
            existing.merge_from(&node);
        } else {
            let id = node.id.clone();
            let idx = inner.graph.add_node(node);
            inner.index.insert(id, idx);
        }
        Ok(())
    }

    async fn write_edge(&self, edge: Edge) -> Result<(), GraphError> {
        let mut inner = self.inner.write().unwrap();
        let source = inner.index.get(&edge.source_id).copied();
        let target = inner.index.get(&edge.target_id).copied();
        match (source, target) {
            (Some(s), Some(t)) => {
                inner.graph.add_edge(s, t, edge);
                Ok(())
            }
            _ => Err(GraphError::MissingEndpoint {
                source: edge.source_id,
                target: edge.target_id,
                relation: edge.relation.as_str().to_string(),
            }),
        }
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .index
            .get(id)
            .and_then(|&idx| inner.graph.node_weight(idx))
            .cloned())
    }

    async fn get_all_nodes(&self) -> Result<Vec<Node>, GraphError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.graph.node_weights().cloned().collect())
    }

    async fn get_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>, GraphError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .graph
            .node_weights()
            .filter(|n| n.kind == kind)
            .cloned()
            .collect())
    }

    async fn get_all_edges(&self) -> Result<Vec<Edge>, GraphError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.graph.edge_weights().cloned().collect())
    }

    async fn get_node_count(&self) -> Result<usize, GraphError> {
        Ok(self.inner.read().unwrap().graph.node_count())
    }

    async fn get_edge_count(&self) -> Result<usize, GraphError> {
        Ok(self.inner.read().unwrap().graph.edge_count())
    }

    async fn clear_graph(&self) -> Result<(), GraphError> {
        let mut inner = self.inner.write().unwrap();
        inner.graph.clear();
        inner.index.clear();
        Ok(())
    }
}

impl InMemoryGraph {
    /// Outgoing edges of `source_id` matching `relation`, resolved to
    /// `(edge, target node)` pairs. Used by the cross-package analyzer, which
    /// needs graph-level traversal beyond the flat contract.
    pub fn edges_from_by_relation(&self, source_id: &str, relation: EdgeKind) -> Vec<(Edge, Node)> {
        let inner = self.inner.read().unwrap();
        let Some(&idx) = inner.index.get(source_id) else {
            return Vec::new();
        };
        inner
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().relation == relation)
            .filter_map(|e| {
                inner
                    .graph
                    .node_weight(e.target())
                    .map(|n| (e.weight().clone(), n.clone()))
            })
            .collect()
    }

    /// Incoming `contains` edges, i.e. the containing parent of `target_id`.
    pub fn container_of(&self, target_id: &str) -> Option<Node> {
        let inner = self.inner.read().unwrap();
        let &idx = inner.index.get(target_id)?;
        inner
            .graph
            .edges_directed(idx, Direction::Incoming)
            .find(|e| e.weight().relation == EdgeKind::Contains)
            .and_then(|e| inner.graph.node_weight(e.source()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[tokio::test]
    async fn write_node_merges_on_repeated_id() {
        let g = InMemoryGraph::new();
        g.write_node(Node::new("pipeline:Q1", NodeKind::Pipeline, "Q1").with_property("a", 1))
            .await
            .unwrap();
        g.write_node(Node::new("pipeline:Q1", NodeKind::Pipeline, "Q1").with_property("b", 2))
            .await
            .unwrap();
        assert_eq!(g.get_node_count().await.unwrap(), 1);
        let node = g.get_node("pipeline:Q1").await.unwrap().unwrap();
        assert_eq!(node.get_property("a").unwrap(), 1);
        assert_eq!(node.get_property("b").unwrap(), 2);
    }

    #[tokio::test]
    async fn write_edge_fails_on_missing_endpoint() {
        let g = InMemoryGraph::new();
        g.write_node(Node::new("pipeline:Q1", NodeKind::Pipeline, "Q1"))
            .await
            .unwrap();
        let err = g
            .write_edge(Edge::new("pipeline:Q1", "operation:Q1/Missing", EdgeKind::Contains))
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::MissingEndpoint { .. }));
    }

    #[tokio::test]
    async fn get_nodes_by_kind_filters() {
        let g = InMemoryGraph::new();
        g.add_nodes(vec![
            Node::new("pipeline:Q1", NodeKind::Pipeline, "Q1"),
            Node::new("table:T", NodeKind::Table, "T"),
        ])
        .await
        .unwrap();
        assert_eq!(g.get_nodes_by_kind(NodeKind::Table).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_graph_empties_everything() {
        let g = InMemoryGraph::new();
        g.write_node(Node::new("pipeline:Q1", NodeKind::Pipeline, "Q1"))
            .await
            .unwrap();
        g.clear_graph().await.unwrap();
        assert_eq!(g.get_node_count().await.unwrap(), 0);
    }
}
