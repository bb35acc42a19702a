//! End-to-end integration tests exercising ingestion, cross-package
//! analysis, and the hierarchical search index together.

use etlgraph_core::{EdgeKind, GraphClient, InMemoryGraph, NodeKind};
use etlgraph_index::{EtlHierarchicalIndex, SearchMode};
use std::fs;
use std::process::Command;

const PACKAGE_A: &str = r#"<?xml version="1.0"?>
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts" DTS:ObjectName="LoadProducts" DTS:ExecutableType="Package">
  <DTS:Executables>
    <DTS:Executable DTS:ObjectName="PopulateProducts" DTS:ExecutableType="Microsoft.ExecuteSQLTask">
      <DTS:ObjectData>
        <SQLTask:SqlTaskData xmlns:SQLTask="foo" SqlStatementSource="INSERT INTO Products SELECT * FROM Staging" />
      </DTS:ObjectData>
    </DTS:Executable>
  </DTS:Executables>
</DTS:Executable>"#;

const PACKAGE_B: &str = r#"<?xml version="1.0"?>
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts" DTS:ObjectName="ReportProducts" DTS:ExecutableType="Package">
  <DTS:Executables>
    <DTS:Executable DTS:ObjectName="ReadProducts" DTS:ExecutableType="Microsoft.ExecuteSQLTask">
      <DTS:ObjectData>
        <SQLTask:SqlTaskData xmlns:SQLTask="foo" SqlStatementSource="SELECT * FROM Products" />
      </DTS:ObjectData>
    </DTS:Executable>
  </DTS:Executables>
</DTS:Executable>"#;

#[tokio::test]
async fn ingest_then_analyze_links_cross_package_dependency() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("LoadProducts.dtsx"), PACKAGE_A).unwrap();
    fs::write(dir.path().join("ReportProducts.dtsx"), PACKAGE_B).unwrap();

    let graph = InMemoryGraph::new();
    let report = etlgraph_orchestrator::run_ingest(dir.path(), None, &graph).await.unwrap();
    assert_eq!(report.tools_run, vec!["ssis", "informatica"]);
    assert!(graph.get_node("pipeline:LoadProducts").await.unwrap().is_some());
    assert!(graph.get_node("pipeline:ReportProducts").await.unwrap().is_some());

    let analysis = etlgraph_analyzer::analyze(&graph).await.unwrap();
    assert_eq!(analysis.pipelines_analyzed, 2);
    assert!(analysis.depends_on_edges_written > 0);
    assert!(!analysis.cycle_detected);

    let edges = graph.get_all_edges().await.unwrap();
    assert!(edges.iter().any(|e| e.source_id == "pipeline:ReportProducts"
        && e.target_id == "pipeline:LoadProducts"
        && e.relation == EdgeKind::DependsOn));

    let load_products = graph.get_node("pipeline:LoadProducts").await.unwrap().unwrap();
    let report_products = graph.get_node("pipeline:ReportProducts").await.unwrap().unwrap();
    let load_priority = load_products.properties.get("execution_priority").and_then(|v| v.as_u64()).unwrap();
    let report_priority = report_products.properties.get("execution_priority").and_then(|v| v.as_u64()).unwrap();
    assert!(load_priority < report_priority);
}

#[tokio::test]
async fn search_finds_the_operation_that_touches_the_shared_table() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("LoadProducts.dtsx"), PACKAGE_A).unwrap();
    fs::write(dir.path().join("ReportProducts.dtsx"), PACKAGE_B).unwrap();

    let graph = InMemoryGraph::new();
    etlgraph_orchestrator::run_ingest(dir.path(), None, &graph).await.unwrap();

    let nodes = graph.get_all_nodes().await.unwrap();
    assert!(nodes.iter().any(|n| n.kind == NodeKind::Table && n.id == "table:Products"));

    let index = EtlHierarchicalIndex::build(&nodes);
    let hits = index.search("Products", SearchMode::All, 10);
    assert!(!hits.is_empty());
    assert!(hits.iter().any(|h| h.id == "table:Products"));

    let sql_hits = index.inner().search("SELECT FROM Products", SearchMode::Content, 10);
    assert!(sql_hits.iter().any(|h| h.id.contains("ReadProducts")));
}

#[test]
fn ingest_over_an_empty_root_leaves_the_graph_empty() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let graph = InMemoryGraph::new();
        let report = etlgraph_orchestrator::run_ingest(dir.path(), None, &graph).await.unwrap();
        assert_eq!(report.node_count, 0);
        assert_eq!(report.edge_count, 0);
    });
}

/// Smoke-tests the compiled binary itself rather than the library crates.
#[test]
fn cli_prints_help_text() {
    let output = Command::new(env!("CARGO_BIN_EXE_etlgraph")).arg("--help").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("etlgraph"));
    assert!(stdout.contains("ingest"));
}

#[test]
fn cli_ingest_subcommand_reports_ingested_packages() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("LoadProducts.dtsx"), PACKAGE_A).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_etlgraph"))
        .args(["ingest", dir.path().to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
}
