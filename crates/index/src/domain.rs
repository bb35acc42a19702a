//! Domain-aware extension of the hierarchical index for ETL business logic:
//! extended key-property whitelists, migration-intelligence search, and
//! discovery predicates over node kind.

use crate::hierarchical::{HierarchicalIndex, SearchHit, SearchMode};
use etlgraph_core::{Node, NodeKind};

/// Extends the base whitelist with ETL business-logic properties: SQL
/// transformation text, derived-column expressions, error handling, and
/// connection-expression detail that the generic whitelist has no reason
/// to know about.
fn etl_key_properties(kind: NodeKind) -> &'static [&'static str] {
    match kind {
        NodeKind::Operation => &[
            "name",
            "operation_subtype",
            "sql_command",
            "sql_query",
            "expressions",
            "filter_condition",
            "update_strategy_expression",
            "error_disposition",
            "error_outputs",
        ],
        NodeKind::Connection => &["name", "connection_string", "resolved_connection", "parameterized_connection"],
        NodeKind::Pipeline => &[
            "name",
            "source_file",
            "execution_priority",
            "upstream_dependencies",
            "downstream_dependencies",
            "shared_tables_used",
            "shared_connections_used",
        ],
        other => crate::hierarchical::key_properties(other),
    }
}

/// Focus areas accepted by [`EtlHierarchicalIndex::migration_intelligence_search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationFocus {
    SqlOperations,
    CrossPackageDependencies,
    ErrorHandling,
    SharedResources,
    General,
}

impl MigrationFocus {
    fn expansion_terms(self) -> &'static str {
        match self {
            MigrationFocus::SqlOperations => "sql_transformation query_type",
            MigrationFocus::CrossPackageDependencies => "depends_on upstream_dependencies downstream_dependencies",
            MigrationFocus::ErrorHandling => "error_handling error_disposition error_outputs",
            MigrationFocus::SharedResources => "shared_tables shared_connections uses_table uses_connection",
            MigrationFocus::General => "",
        }
    }
}

pub struct EtlHierarchicalIndex {
    inner: HierarchicalIndex,
}

impl EtlHierarchicalIndex {
    pub fn build(nodes: &[Node]) -> Self {
        EtlHierarchicalIndex { inner: HierarchicalIndex::build_with_whitelist(nodes, &etl_key_properties) }
    }

    pub fn inner(&self) -> &HierarchicalIndex {
        &self.inner
    }

    pub fn search(&self, query: &str, mode: SearchMode, top_k: usize) -> Vec<SearchHit> {
        self.inner.search(query, mode, top_k)
    }

    /// Prepends focus-specific expansion terms to `query` before delegating
    /// to content search; `MigrationFocus::General` delegates to the unified
    /// search instead, matching every other focus area's terminal behavior.
    pub fn migration_intelligence_search(&self, focus: MigrationFocus, query: &str, top_k: usize) -> Vec<SearchHit> {
        if focus == MigrationFocus::General {
            return self.inner.search(query, SearchMode::All, top_k);
        }
        let expanded = format!("{query} {}", focus.expansion_terms());
        self.inner.search_content(&expanded, top_k)
    }

    fn discover(&self, proxy_query: &str, kind: &str, top_k: usize) -> Vec<SearchHit> {
        self.inner
            .search_content(proxy_query, top_k)
            .into_iter()
            .filter(|hit| self.inner.find_by_id(&hit.id).is_some_and(|n| n.kind.as_str() == kind))
            .collect()
    }

    pub fn shared_tables_across_packages(&self, top_k: usize) -> Vec<SearchHit> {
        self.discover("shared_across_packages integration_point", "table", top_k)
    }

    pub fn sql_operations(&self, top_k: usize) -> Vec<SearchHit> {
        self.discover("sql_transformation query_type", "operation", top_k)
    }

    pub fn parameterized_connections(&self, top_k: usize) -> Vec<SearchHit> {
        self.discover("parameterized_connection uses_parameters", "connection", top_k)
    }

    pub fn cross_package_pipelines(&self, top_k: usize) -> Vec<SearchHit> {
        self.discover("upstream_dependencies downstream_dependencies", "pipeline", top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etlgraph_core::{Node, NodeKind};

    fn sample() -> Vec<Node> {
        vec![
            Node::new("operation:SQ_Customers", NodeKind::Operation, "SQ_Customers")
                .with_property("sql_query", "SELECT * FROM customers")
                .with_property("query_type", "select"),
            Node::new("pipeline:Load", NodeKind::Pipeline, "Load")
                .with_property("upstream_dependencies", serde_json::json!(["pipeline:Extract"])),
        ]
    }

    #[test]
    fn migration_intelligence_search_expands_sql_focus() {
        let index = EtlHierarchicalIndex::build(&sample());
        let hits = index.migration_intelligence_search(MigrationFocus::SqlOperations, "customers", 5);
        assert!(hits.iter().any(|h| h.id == "operation:SQ_Customers"));
    }

    #[test]
    fn general_focus_delegates_to_unified_search() {
        let index = EtlHierarchicalIndex::build(&sample());
        let hits = index.migration_intelligence_search(MigrationFocus::General, "operation:SQ_Customers", 5);
        assert_eq!(hits[0].id, "operation:SQ_Customers");
        assert_eq!(hits[0].score, 1.0);
    }

    #[test]
    fn cross_package_pipelines_filters_to_pipeline_kind() {
        let index = EtlHierarchicalIndex::build(&sample());
        let hits = index.cross_package_pipelines(10);
        assert!(hits.iter().all(|h| index.inner().find_by_id(&h.id).unwrap().kind == NodeKind::Pipeline));
    }
}
