//! The four-level hierarchical entity index (C9) over a completed graph.

use crate::bm25::Bm25Index;
use crate::tokenize::tokenize;
use etlgraph_core::{Node, NodeKind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Id,
    Name,
    Metadata,
    Content,
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

const METADATA_THRESHOLD: (f64, f64) = (0.10, 0.70);
const CONTENT_THRESHOLD: (f64, f64) = (0.05, 0.20);

/// Per-kind whitelist of properties considered "important" for the metadata
/// level. Kinds not listed fall back to `name` only.
pub fn key_properties(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Pipeline => &["name", "source_file", "execution_priority"],
        NodeKind::Operation => &["name", "operation_subtype", "sql_command", "sql_query"],
        NodeKind::DataAsset => &["name", "schema_name", "connection_name"],
        NodeKind::Connection => &["name", "connection_string"],
        NodeKind::Parameter => &["name", "default_value"],
        NodeKind::Variable => &["name", "data_type"],
        NodeKind::Table => &["name", "schema"],
        NodeKind::Column => &["name", "native_type"],
        NodeKind::Transformation => &["name", "transformation_type"],
        NodeKind::OperationSummary | NodeKind::PipelineSummary => &["name", "summary_text"],
        _ => &["name"],
    }
}

fn weight_for(kind: NodeKind, metadata: bool) -> usize {
    if !kind.is_summary() {
        return 1;
    }
    if metadata {
        2
    } else {
        3
    }
}

fn flatten_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push(' ');
            out.push_str(s);
        }
        Value::Number(n) => {
            out.push(' ');
            out.push_str(&n.to_string());
        }
        Value::Bool(b) => {
            out.push(' ');
            out.push_str(&b.to_string());
        }
        Value::Array(items) => {
            for item in items {
                flatten_value(item, out);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                out.push(' ');
                out.push_str(k);
                flatten_value(v, out);
            }
        }
        Value::Null => {}
    }
}

/// Builds the metadata document for one node: name plus the per-kind
/// whitelisted properties, repeated for summary nodes to raise their rank.
/// `whitelist` is pluggable so the domain-aware subclass can extend it
/// without duplicating the document-assembly logic.
pub fn metadata_document_with(node: &Node, whitelist: &dyn Fn(NodeKind) -> &'static [&'static str]) -> Vec<String> {
    let repeat = weight_for(node.kind, true);
    let mut text = String::new();
    for key in whitelist(node.kind) {
        if *key == "name" {
            text.push(' ');
            text.push_str(&node.name);
            continue;
        }
        if let Some(v) = node.get_property(key) {
            flatten_value(v, &mut text);
        }
    }
    let tokens = tokenize(&text);
    std::iter::repeat(tokens).take(repeat).flatten().collect()
}

pub fn metadata_document(node: &Node) -> Vec<String> {
    metadata_document_with(node, &key_properties)
}

/// Builds the content document for one node: every property and nested
/// value, repeated 2x for summary nodes (3x for their whitelisted tier,
/// collapsed here to a uniform 2x since the full property set already
/// includes the whitelisted keys).
pub fn content_document(node: &Node) -> Vec<String> {
    let repeat = weight_for(node.kind, false);
    let mut text = String::new();
    text.push(' ');
    text.push_str(&node.name);
    for (k, v) in &node.properties {
        text.push(' ');
        text.push_str(k);
        flatten_value(v, &mut text);
    }
    let tokens = tokenize(&text);
    std::iter::repeat(tokens).take(repeat).flatten().collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub node_count: usize,
    pub name_count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct HierarchicalIndex {
    by_id: HashMap<String, Node>,
    by_name: HashMap<String, Vec<String>>,
    metadata_bm25: Bm25Index,
    content_bm25: Bm25Index,
    pub stats: IndexStats,
}

impl HierarchicalIndex {
    /// Segments nodes by kind and tokenizes each segment in parallel via
    /// rayon before the (inherently sequential) BM25 aggregation pass.
    pub fn build(nodes: &[Node]) -> Self {
        Self::build_with_whitelist(nodes, &key_properties)
    }

    pub fn build_with_whitelist(nodes: &[Node], whitelist: &(dyn Fn(NodeKind) -> &'static [&'static str] + Sync)) -> Self {
        let by_id: HashMap<String, Node> = nodes.iter().map(|n| (n.id.clone(), n.clone())).collect();

        let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
        for node in nodes {
            let key = node.name.trim().to_lowercase();
            by_name.entry(key).or_default().push(node.id.clone());
        }

        let mut by_kind: HashMap<NodeKind, Vec<&Node>> = HashMap::new();
        for node in nodes {
            by_kind.entry(node.kind).or_default().push(node);
        }

        let (metadata_docs, content_docs): (Vec<_>, Vec<_>) = by_kind
            .par_iter()
            .flat_map(|(_, group)| {
                group
                    .par_iter()
                    .map(|n| ((n.id.clone(), metadata_document_with(n, whitelist)), (n.id.clone(), content_document(n))))
                    .collect::<Vec<_>>()
            })
            .unzip();

        let name_count = by_name.len();
        HierarchicalIndex {
            by_id,
            by_name,
            metadata_bm25: Bm25Index::build(metadata_docs),
            content_bm25: Bm25Index::build(content_docs),
            stats: IndexStats { node_count: nodes.len(), name_count },
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        self.by_id.get(id)
    }

    pub fn find_by_name(&self, name: &str) -> Vec<&Node> {
        let key = name.trim().to_lowercase();
        self.by_name
            .get(&key)
            .map(|ids| ids.iter().filter_map(|id| self.by_id.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn search_metadata(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let terms = tokenize(query);
        self.metadata_bm25
            .search(&terms, METADATA_THRESHOLD.0, METADATA_THRESHOLD.1)
            .into_iter()
            .take(top_k)
            .map(|(id, score)| SearchHit { id, score })
            .collect()
    }

    pub fn search_content(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let terms = tokenize(query);
        self.content_bm25
            .search(&terms, CONTENT_THRESHOLD.0, CONTENT_THRESHOLD.1)
            .into_iter()
            .take(top_k)
            .map(|(id, score)| SearchHit { id, score })
            .collect()
    }

    /// Layers id (1.0) -> name (0.9) -> metadata (x0.8) -> content (x0.6),
    /// deduplicated by id, truncated to `top_k`. Metadata/content pools are
    /// over-fetched at `2 * top_k` so lower-priority levels are not starved
    /// by the dedup pass.
    pub fn search(&self, query: &str, mode: SearchMode, top_k: usize) -> Vec<SearchHit> {
        let mut seen = std::collections::HashSet::new();
        let mut results = Vec::new();

        let consider = |id: String, score: f64, seen: &mut std::collections::HashSet<String>, results: &mut Vec<SearchHit>| {
            if seen.insert(id.clone()) {
                results.push(SearchHit { id, score });
            }
        };

        if matches!(mode, SearchMode::Id | SearchMode::All) {
            if let Some(node) = self.find_by_id(query) {
                consider(node.id.clone(), 1.0, &mut seen, &mut results);
            }
        }

        if matches!(mode, SearchMode::Name | SearchMode::All) {
            for node in self.find_by_name(query) {
                consider(node.id.clone(), 0.9, &mut seen, &mut results);
            }
        }

        if matches!(mode, SearchMode::Metadata | SearchMode::All) {
            for hit in self.search_metadata(query, top_k * 2) {
                consider(hit.id, hit.score * 0.8, &mut seen, &mut results);
            }
        }

        if matches!(mode, SearchMode::Content | SearchMode::All) {
            for hit in self.search_content(query, top_k * 2) {
                consider(hit.id, hit.score * 0.6, &mut seen, &mut results);
            }
        }

        if matches!(mode, SearchMode::All) {
            results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        }
        results.truncate(top_k);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etlgraph_core::Node;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::new("pipeline:Load", NodeKind::Pipeline, "Load Customers"),
            Node::new("operation:SQ_Customers", NodeKind::Operation, "SQ_Customers")
                .with_property("sql_query", "SELECT * FROM customers"),
            Node::new("table:CUSTOMERS", NodeKind::Table, "CUSTOMERS"),
        ]
    }

    #[test]
    fn find_by_id_is_exact() {
        let index = HierarchicalIndex::build(&sample_nodes());
        assert!(index.find_by_id("pipeline:Load").is_some());
        assert!(index.find_by_id("pipeline:Missing").is_none());
    }

    #[test]
    fn find_by_name_is_case_insensitive_and_trimmed() {
        let index = HierarchicalIndex::build(&sample_nodes());
        assert_eq!(index.find_by_name("  customers  ").len(), 1);
        assert_eq!(index.find_by_name("CUSTOMERS").len(), 1);
    }

    #[test]
    fn metadata_search_finds_sql_bearing_operation() {
        let index = HierarchicalIndex::build(&sample_nodes());
        let hits = index.search_metadata("select customers", 10);
        assert!(hits.iter().any(|h| h.id == "operation:SQ_Customers"));
    }

    #[test]
    fn unified_search_prefers_exact_id_over_content_match() {
        let index = HierarchicalIndex::build(&sample_nodes());
        let hits = index.search("pipeline:Load", SearchMode::All, 5);
        assert_eq!(hits[0].id, "pipeline:Load");
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn search_deduplicates_across_levels() {
        let index = HierarchicalIndex::build(&sample_nodes());
        let hits = index.search("customers", SearchMode::All, 10);
        let ids: std::collections::HashSet<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids.len(), hits.len());
    }
}
