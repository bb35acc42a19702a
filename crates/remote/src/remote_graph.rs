//! Cypher-backed [`GraphClient`] implementation (C6 remote backend).
//!
//! Every node carries a generic `Node` label alongside its kind-specific
//! label (`MERGE (n:Node:Pipeline {id: $id})`), so the analytics-readiness
//! indexes in [`crate::readiness`] can target `:Node` uniformly. Properties
//! and context maps are JSON-encoded into string properties, since Neo4j
//! property values must be primitives or arrays of primitives, not nested
//! maps.

use async_trait::async_trait;
use etlgraph_core::{Edge, EdgeKind, GraphClient, GraphError, Node, NodeKind};
use neo4rs::{query, Graph};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct RemoteGraph {
    pub(crate) graph: Graph,
    pub(crate) prepared: AtomicBool,
}

impl RemoteGraph {
    /// Attempts an unauthenticated connection first; if that fails and
    /// credentials were supplied, retries authenticated. Reconnection is not
    /// attempted beyond this single fallback.
    pub async fn connect(
        uri: &str,
        user: Option<&str>,
        password: Option<&str>,
        database: Option<&str>,
    ) -> Result<Self, GraphError> {
        let db = database.unwrap_or("neo4j");

        let unauthenticated = neo4rs::config()
            .uri(uri)
            .user("")
            .password("")
            .db(db)
            .build()
            .ok();

        let graph = match unauthenticated {
            Some(cfg) => match Graph::connect(cfg).await {
                Ok(g) => g,
                Err(e) => Self::connect_authenticated(uri, user, password, db).await.map_err(|_| {
                    GraphError::BackendUnavailable(format!("unauthenticated connect to {uri} failed: {e}"))
                })?,
            },
            None => Self::connect_authenticated(uri, user, password, db)
                .await
                .map_err(|e| GraphError::BackendUnavailable(e))?,
        };

        Ok(RemoteGraph {
            graph,
            prepared: AtomicBool::new(false),
        })
    }

    async fn connect_authenticated(
        uri: &str,
        user: Option<&str>,
        password: Option<&str>,
        db: &str,
    ) -> Result<Graph, String> {
        let (Some(user), Some(password)) = (user, password) else {
            return Err("no credentials configured for authenticated retry".to_string());
        };
        let cfg = neo4rs::config()
            .uri(uri)
            .user(user)
            .password(password)
            .db(db)
            .build()
            .map_err(|e| e.to_string())?;
        Graph::connect(cfg).await.map_err(|e| e.to_string())
    }

    fn wrap_err(e: impl std::fmt::Display) -> GraphError {
        GraphError::BackendUnavailable(e.to_string())
    }

    fn node_from_row(row: &neo4rs::Row) -> Option<Node> {
        let id: String = row.get("id").ok()?;
        let name: String = row.get("name").ok().unwrap_or_default();
        let kind_str: String = row.get("kind").ok().unwrap_or_default();
        let kind = NodeKind::from_str(&kind_str).ok()?;
        let properties_json: String = row.get("properties_json").ok().unwrap_or_default();
        let context_json: String = row.get("context_json").ok().unwrap_or_default();

        let properties: Map<String, Value> = serde_json::from_str(&properties_json).unwrap_or_default();
        let context: Map<String, Value> = serde_json::from_str(&context_json).unwrap_or_default();

        Some(Node {
            id,
            kind,
            name,
            properties,
            context,
        })
    }
}

#[async_trait]
impl GraphClient for RemoteGraph {
    async fn write_node(&self, node: Node) -> Result<(), GraphError> {
        let label = node.kind.as_str();
        let properties_json = serde_json::to_string(&node.properties).unwrap_or_default();
        let context_json = serde_json::to_string(&node.context).unwrap_or_default();

        let cypher = format!(
            "MERGE (n:Node:{label} {{id: $id}}) \
             SET n.name = $name, n.kind = $kind, n.properties_json = $properties_json, n.context_json = $context_json"
        );
        let q = query(&cypher)
            .param("id", node.id)
            .param("name", node.name)
            .param("kind", node.kind.as_str())
            .param("properties_json", properties_json)
            .param("context_json", context_json);

        self.graph.run(q).await.map_err(Self::wrap_err)
    }

    /// Silently accepted: a `MERGE` on a `MATCH`ed pair of endpoints simply
    /// creates zero relationships when either endpoint is absent, rather than
    /// erroring eagerly the way the in-memory backend does.
    async fn write_edge(&self, edge: Edge) -> Result<(), GraphError> {
        let relation = edge.relation.as_str();
        let properties_json = serde_json::to_string(&edge.properties).unwrap_or_default();

        let cypher = format!(
            "MATCH (a:Node {{id: $source}}), (b:Node {{id: $target}}) \
             MERGE (a)-[r:{relation}]->(b) SET r.properties_json = $properties_json"
        );
        let q = query(&cypher)
            .param("source", edge.source_id)
            .param("target", edge.target_id)
            .param("properties_json", properties_json);

        self.graph.run(q).await.map_err(Self::wrap_err)
    }

    async fn get_node(&self, id: &str) -> Result<Option<Node>, GraphError> {
        let q = query("MATCH (n:Node {id: $id}) RETURN n.id AS id, n.name AS name, n.kind AS kind, n.properties_json AS properties_json, n.context_json AS context_json")
            .param("id", id);
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let row = result.next().await.map_err(Self::wrap_err)?;
        Ok(row.and_then(|r| Self::node_from_row(&r)))
    }

    async fn get_all_nodes(&self) -> Result<Vec<Node>, GraphError> {
        let q = query("MATCH (n:Node) RETURN n.id AS id, n.name AS name, n.kind AS kind, n.properties_json AS properties_json, n.context_json AS context_json");
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let mut nodes = Vec::new();
        while let Some(row) = result.next().await.map_err(Self::wrap_err)? {
            if let Some(n) = Self::node_from_row(&row) {
                nodes.push(n);
            }
        }
        Ok(nodes)
    }

    async fn get_nodes_by_kind(&self, kind: NodeKind) -> Result<Vec<Node>, GraphError> {
        let q = query("MATCH (n:Node {kind: $kind}) RETURN n.id AS id, n.name AS name, n.kind AS kind, n.properties_json AS properties_json, n.context_json AS context_json")
            .param("kind", kind.as_str());
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let mut nodes = Vec::new();
        while let Some(row) = result.next().await.map_err(Self::wrap_err)? {
            if let Some(n) = Self::node_from_row(&row) {
                nodes.push(n);
            }
        }
        Ok(nodes)
    }

    async fn get_all_edges(&self) -> Result<Vec<Edge>, GraphError> {
        let q = query(
            "MATCH (a:Node)-[r]->(b:Node) RETURN a.id AS source_id, b.id AS target_id, type(r) AS relation, r.properties_json AS properties_json",
        );
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let mut edges = Vec::new();
        while let Some(row) = result.next().await.map_err(Self::wrap_err)? {
            let source_id: String = row.get("source_id").unwrap_or_default();
            let target_id: String = row.get("target_id").unwrap_or_default();
            let relation_str: String = row.get("relation").unwrap_or_default();
            let properties_json: String = row.get("properties_json").unwrap_or_default();
            let Ok(relation) = EdgeKind::from_str(&relation_str.to_lowercase()) else {
                tracing::warn!(relation = %relation_str, "unrecognized edge relation returned by backend, skipping");
                continue;
            };
            let properties = serde_json::from_str(&properties_json).unwrap_or_default();
            edges.push(Edge {
                source_id,
                target_id,
                relation,
                properties,
            });
        }
        Ok(edges)
    }

    async fn get_node_count(&self) -> Result<usize, GraphError> {
        let q = query("MATCH (n:Node) RETURN count(n) AS c");
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let row = result.next().await.map_err(Self::wrap_err)?;
        let count: i64 = row.and_then(|r| r.get("c").ok()).unwrap_or(0);
        Ok(count.max(0) as usize)
    }

    async fn get_edge_count(&self) -> Result<usize, GraphError> {
        let q = query("MATCH (:Node)-[r]->(:Node) RETURN count(r) AS c");
        let mut result = self.graph.execute(q).await.map_err(Self::wrap_err)?;
        let row = result.next().await.map_err(Self::wrap_err)?;
        let count: i64 = row.and_then(|r| r.get("c").ok()).unwrap_or(0);
        Ok(count.max(0) as usize)
    }

    async fn clear_graph(&self) -> Result<(), GraphError> {
        let q = query("MATCH (n) DETACH DELETE n");
        self.graph.run(q).await.map_err(Self::wrap_err)?;
        self.prepared.store(false, Ordering::SeqCst);
        Ok(())
    }
}
