//! etlgraph-ssis — the SSIS parser (C4): `.dtsx` packages, `.conmgr`
//! connection managers, and `Project.params` project parameters, interpreted
//! into canonical nodes/edges.

pub mod connection;
pub mod dataflow;
pub mod error;
pub mod expr;
pub mod operations;
pub mod package;
pub mod parameters;
pub mod platform;
pub mod precedence;
pub mod script_task;
pub mod source;
pub mod sql_task;
pub mod variables;
pub mod xmltree;

pub use error::SsisParseError;
pub use operations::OperationSubtype;
pub use package::{parse_package, PackageBatch};

use etlgraph_core::{Edge, Node, NodeKind, SourceContext};
use serde_json::json;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Discovers and parses every SSIS artifact under `root_path`, yielding one
/// `(nodes, edges)` batch per logical unit. Per the C7 orchestrator
/// contract, batches are ordered so that container nodes (project
/// parameters, global connection managers, then each package's pipeline)
/// precede anything that references them; the deduplicated table-node batch
/// is emitted before the per-package batches that read/write those tables.
pub struct SsisIngestionTool {
    root: PathBuf,
    target_file: Option<PathBuf>,
}

impl SsisIngestionTool {
    pub fn new(root: impl Into<PathBuf>, target_file: Option<PathBuf>) -> Self {
        SsisIngestionTool {
            root: root.into(),
            target_file,
        }
    }

    /// Technology name used in the orchestrator's tool registry and in
    /// tracing spans.
    pub fn name(&self) -> &'static str {
        "ssis"
    }

    pub fn ingest(&self) -> Vec<(Vec<Node>, Vec<Edge>)> {
        let mut batches = Vec::new();

        // --- Pre-passes: project parameters, then global connection managers.
        let mut project_parameters = Vec::new();
        for path in discover(&self.root, &self.target_file, is_project_params_file) {
            project_parameters.extend(parameters::parse_project_params(&path));
        }
        let pre_pass_nodes: Vec<Node> = project_parameters
            .iter()
            .map(|p| p.to_node("Project.params"))
            .collect();

        let (_global_connections, conmgr_nodes) = connection::load_conmgr_files(&self.root);
        if !pre_pass_nodes.is_empty() || !conmgr_nodes.is_empty() {
            let mut nodes = pre_pass_nodes;
            nodes.extend(conmgr_nodes);
            batches.push((nodes, Vec::new()));
        }

        // --- Package pass.
        let mut package_batches = Vec::new();
        let mut table_platform: std::collections::HashMap<String, &'static str> = std::collections::HashMap::new();
        let mut seen_tables: HashSet<String> = HashSet::new();

        for path in discover(&self.root, &self.target_file, is_dtsx_file) {
            let xml = match source::read_xml_file(&path) {
                Ok(xml) => xml,
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "failed to read SSIS package, skipping");
                    continue;
                }
            };
            let doc = match xmltree::parse(&xml) {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::error!(file = %path.display(), error = %e, "malformed SSIS package XML, skipping");
                    continue;
                }
            };

            let batch = package::parse_package(&doc, &path.to_string_lossy(), &project_parameters);
            for table_id in &batch.referenced_tables {
                if seen_tables.insert(table_id.clone()) {
                    if let Some(platform) = batch.table_platform_hint {
                        table_platform.insert(table_id.clone(), platform);
                    }
                }
            }
            package_batches.push(batch);
        }

        if !seen_tables.is_empty() {
            let mut table_nodes = Vec::new();
            for table_id in &seen_tables {
                let name = table_id.trim_start_matches("table:").to_string();
                let context = SourceContext::inference(self.root.to_string_lossy(), "ssis");
                let platform = table_platform.get(table_id).copied().unwrap_or("sql_server");
                table_nodes.push(
                    Node::new(table_id.clone(), NodeKind::Table, name)
                        .with_property("platform_type", json!(platform))
                        .with_property("type_mapping_enabled", json!(true))
                        .with_property(
                            "supported_platforms",
                            json!(etlgraph_typemap::TargetPlatform::defaults()
                                .iter()
                                .map(|p| p.as_str())
                                .collect::<Vec<_>>()),
                        )
                        .with_context(context),
                );
            }
            batches.push((table_nodes, Vec::new()));
        }

        for batch in package_batches {
            batches.push((batch.nodes, batch.edges));
        }

        batches
    }
}

fn is_dtsx_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("dtsx")
}

fn is_project_params_file(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some("Project.params")
}

fn discover(root: &Path, target_file: &Option<PathBuf>, matches: impl Fn(&Path) -> bool) -> Vec<PathBuf> {
    if let Some(target) = target_file {
        return if matches(target) { vec![target.clone()] } else { vec![] };
    }
    let mut found = Vec::new();
    let walker = ignore::WalkBuilder::new(root).build();
    for entry in walker.flatten() {
        let path = entry.path();
        if matches(path) {
            found.push(path.to_path_buf());
        }
    }
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SAMPLE_DTSX: &str = r#"<?xml version="1.0"?>
<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts" DTS:ObjectName="Q1" DTS:ExecutableType="Package">
  <DTS:Executables>
    <DTS:Executable DTS:ObjectName="ExecuteSQL" DTS:ExecutableType="Microsoft.ExecuteSQLTask">
      <DTS:ObjectData>
        <SQLTask:SqlTaskData xmlns:SQLTask="foo" SqlStatementSource="SELECT * FROM Products" />
      </DTS:ObjectData>
    </DTS:Executable>
  </DTS:Executables>
</DTS:Executable>"#;

    #[test]
    fn empty_root_yields_no_batches() {
        let dir = tempfile::tempdir().unwrap();
        let tool = SsisIngestionTool::new(dir.path(), None);
        assert!(tool.ingest().is_empty());
    }

    #[test]
    fn scenario_a_simple_read_produces_expected_graph() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Q1.dtsx"), SAMPLE_DTSX).unwrap();

        let tool = SsisIngestionTool::new(dir.path(), None);
        let batches = tool.ingest();

        let all_nodes: Vec<Node> = batches.iter().flat_map(|(n, _)| n.clone()).collect();
        let all_edges: Vec<Edge> = batches.iter().flat_map(|(_, e)| e.clone()).collect();

        assert!(all_nodes.iter().any(|n| n.id == "pipeline:Q1"));
        assert!(all_nodes.iter().any(|n| n.id == "pipeline:Q1/operation:ExecuteSQL"));
        assert!(all_nodes.iter().any(|n| n.id == "table:Products"));
        assert!(all_edges.iter().any(|e| e.source_id == "pipeline:Q1"
            && e.target_id == "pipeline:Q1/operation:ExecuteSQL"
            && e.relation == etlgraph_core::EdgeKind::Contains));
        assert!(all_edges.iter().any(|e| e.source_id == "pipeline:Q1/operation:ExecuteSQL"
            && e.target_id == "table:Products"
            && e.relation == etlgraph_core::EdgeKind::ReadsFrom));
    }

    #[test]
    fn dtsx_with_no_executables_yields_one_pipeline_node() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Empty.dtsx"),
            r#"<DTS:Executable xmlns:DTS="www.microsoft.com/SqlServer/Dts" DTS:ObjectName="Empty" DTS:ExecutableType="Package"/>"#,
        )
        .unwrap();

        let tool = SsisIngestionTool::new(dir.path(), None);
        let batches = tool.ingest();
        let all_nodes: Vec<Node> = batches.iter().flat_map(|(n, _)| n.clone()).collect();

        let operations: Vec<_> = all_nodes.iter().filter(|n| n.kind == NodeKind::Operation).collect();
        assert!(operations.is_empty());
        assert!(all_nodes.iter().any(|n| n.id == "pipeline:Empty"));
    }
}
