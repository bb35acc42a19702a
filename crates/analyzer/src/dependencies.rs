//! Steps 4-6: filter usage maps to shared resources and emit `depends_on`
//! / `shares_resource` edges.

use crate::usage::UsageMaps;
use etlgraph_core::{Edge, EdgeKind};
use serde_json::json;
use std::collections::{HashMap, HashSet};

pub struct DependencyResult {
    pub depends_on_edges: Vec<Edge>,
    pub shares_resource_edges: Vec<Edge>,
    /// `pipeline -> set of pipelines it depends on`, consumed by the
    /// topological leveling step.
    pub upstream: HashMap<String, HashSet<String>>,
    pub high_risk_connections: Vec<String>,
    pub high_risk_tables: Vec<String>,
}

pub fn compute_dependencies(usage: &UsageMaps) -> DependencyResult {
    let mut depends_on_edges = Vec::new();
    let mut shares_resource_edges = Vec::new();
    let mut upstream: HashMap<String, HashSet<String>> = HashMap::new();
    let mut high_risk_tables = Vec::new();

    for (table_id, entry) in &usage.table_usage {
        let packages = entry.packages();
        if packages.len() < 2 {
            continue;
        }
        if entry.writer_packages.is_empty() || entry.reader_packages.is_empty() {
            continue;
        }
        if packages.len() > 2 {
            high_risk_tables.push(table_id.clone());
        }
        for writer_pkg in &entry.writer_packages {
            for reader_pkg in &entry.reader_packages {
                if writer_pkg == reader_pkg {
                    continue;
                }
                upstream.entry(reader_pkg.clone()).or_default().insert(writer_pkg.clone());
                depends_on_edges.push(
                    Edge::new(reader_pkg.clone(), writer_pkg.clone(), EdgeKind::DependsOn)
                        .with_property("dependency_type", json!("data_flow"))
                        .with_property("shared_resource", json!("table"))
                        .with_property("shared_resource_name", json!(table_id))
                        .with_property(
                            "description",
                            json!(format!("{reader_pkg} reads {table_id}, written by {writer_pkg}")),
                        ),
                );
            }
        }
    }

    let mut high_risk_connections = Vec::new();
    emit_shared_resource_edges(
        &usage.connection_usage,
        "connection",
        &mut shares_resource_edges,
        &mut high_risk_connections,
    );
    let mut high_risk_parameters = Vec::new();
    emit_shared_resource_edges(
        &usage.parameter_usage,
        "parameter",
        &mut shares_resource_edges,
        &mut high_risk_parameters,
    );
    high_risk_connections.extend(high_risk_parameters);

    DependencyResult {
        depends_on_edges,
        shares_resource_edges,
        upstream,
        high_risk_connections,
        high_risk_tables,
    }
}

fn emit_shared_resource_edges(
    usage: &HashMap<String, HashSet<String>>,
    resource_kind: &str,
    out: &mut Vec<Edge>,
    high_risk: &mut Vec<String>,
) {
    for (resource_id, packages) in usage {
        if packages.len() < 2 {
            continue;
        }
        let risk = if packages.len() > 3 { "HIGH" } else { "MEDIUM" };
        if risk == "HIGH" {
            high_risk.push(resource_id.clone());
        }
        let mut pkgs: Vec<&String> = packages.iter().collect();
        pkgs.sort();
        for i in 0..pkgs.len() {
            for j in (i + 1)..pkgs.len() {
                out.push(
                    Edge::new(pkgs[i].clone(), pkgs[j].clone(), EdgeKind::SharesResource)
                        .with_property("resource_kind", json!(resource_kind))
                        .with_property("resource_id", json!(resource_id))
                        .with_property("contention_risk", json!(risk))
                        .with_property("shared_by_count", json!(packages.len())),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::TableUsage;

    #[test]
    fn integration_table_emits_depends_on_both_directions_excluded_for_self() {
        let mut usage = UsageMaps::default();
        let mut t = TableUsage::default();
        t.writer_packages.insert("pkg_load".to_string());
        t.reader_packages.insert("pkg_report".to_string());
        t.reader_packages.insert("pkg_load".to_string());
        usage.table_usage.insert("table:CUSTOMERS".to_string(), t);

        let result = compute_dependencies(&usage);
        assert_eq!(result.depends_on_edges.len(), 1);
        let edge = &result.depends_on_edges[0];
        assert_eq!(edge.source_id, "pkg_report");
        assert_eq!(edge.target_id, "pkg_load");
        assert!(result.upstream.get("pkg_report").unwrap().contains("pkg_load"));
    }

    #[test]
    fn table_used_by_single_package_is_not_a_dependency() {
        let mut usage = UsageMaps::default();
        let mut t = TableUsage::default();
        t.writer_packages.insert("pkg_load".to_string());
        t.reader_packages.insert("pkg_load".to_string());
        usage.table_usage.insert("table:CUSTOMERS".to_string(), t);

        let result = compute_dependencies(&usage);
        assert!(result.depends_on_edges.is_empty());
    }

    #[test]
    fn shared_connection_above_three_packages_is_high_risk() {
        let mut usage = UsageMaps::default();
        let pkgs: HashSet<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        usage.connection_usage.insert("conn:SHARED".to_string(), pkgs);

        let result = compute_dependencies(&usage);
        assert_eq!(result.shares_resource_edges.len(), 6);
        assert!(result
            .shares_resource_edges
            .iter()
            .all(|e| e.properties.get("contention_risk") == Some(&json!("HIGH"))));
        assert_eq!(result.high_risk_connections, vec!["conn:SHARED".to_string()]);
    }

    #[test]
    fn shared_connection_with_two_packages_is_medium_risk() {
        let mut usage = UsageMaps::default();
        let pkgs: HashSet<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();
        usage.connection_usage.insert("conn:SHARED".to_string(), pkgs);

        let result = compute_dependencies(&usage);
        assert_eq!(result.shares_resource_edges.len(), 1);
        assert_eq!(
            result.shares_resource_edges[0].properties.get("contention_risk"),
            Some(&json!("MEDIUM"))
        );
        assert!(result.high_risk_connections.is_empty());
    }
}
