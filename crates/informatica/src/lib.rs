//! etlgraph-informatica — the Informatica PowerCenter parser (C5): workflow
//! XML exports paired with the mapping XML they reference, interpreted into
//! canonical nodes/edges. Reuses `etlgraph-ssis`'s XML tree and CP-1252
//! decoder rather than duplicating that infrastructure.

pub mod error;
pub mod mapping;
pub mod transformations;
pub mod workflow;

pub use error::InformaticaParseError;
pub use mapping::{parse_mapping, MappingBatch};
pub use workflow::{parse_workflow, TaskSubtype, WorkflowBatch};

use etlgraph_core::{Edge, Node};
use etlgraph_ssis::{source, xmltree};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Discovers `.xml` exports under `root_path` and classifies each by its
/// root content — a document containing a `WORKFLOW` element is a workflow
/// export, one containing a `MAPPING` element is a mapping export — rather
/// than guessing from file naming conventions, which PowerCenter exports
/// don't follow consistently. A workflow's sessions are paired to a mapping
/// by name across every discovered mapping document (and the workflow's own,
/// for single-file exports). A session naming a mapping with no matching
/// document still yields the workflow's own nodes/edges; only that session's
/// mapping-derived nodes are skipped.
pub struct InformaticaIngestionTool {
    root: PathBuf,
    target_file: Option<PathBuf>,
}

impl InformaticaIngestionTool {
    pub fn new(root: impl Into<PathBuf>, target_file: Option<PathBuf>) -> Self {
        InformaticaIngestionTool {
            root: root.into(),
            target_file,
        }
    }

    pub fn name(&self) -> &'static str {
        "informatica"
    }

    pub fn ingest(&self) -> Vec<(Vec<Node>, Vec<Edge>)> {
        let mut batches = Vec::new();

        let mapping_docs: HashMap<String, xmltree::XmlElement> = discover(&self.root, &None, is_xml_file)
            .iter()
            .filter_map(|path| {
                let doc = read_doc(path)?;
                doc.find_descendant("MAPPING")?;
                Some((path.to_string_lossy().to_string(), doc))
            })
            .collect();

        for path in discover(&self.root, &self.target_file, is_xml_file) {
            let Some(doc) = read_doc(&path) else { continue };
            let mut workflows = Vec::new();
            doc.find_all_descendants("WORKFLOW", &mut workflows);
            if workflows.is_empty() {
                continue;
            }
            let source_path = path.to_string_lossy().to_string();

            for workflow in workflows {
                let wf_batch = parse_workflow(workflow, &source_path);
                let mut nodes = wf_batch.nodes;
                let mut edges = wf_batch.edges;

                for (mapping_name, connections) in &wf_batch.sessions.mapping_connections {
                    let Some((mapping_doc_path, mapping_elem)) =
                        find_mapping(&mapping_docs, &doc, mapping_name)
                    else {
                        tracing::warn!(
                            workflow = %wf_batch.pipeline_id,
                            mapping = %mapping_name,
                            "could not locate a mapping definition, skipping its nodes"
                        );
                        continue;
                    };
                    let mb = parse_mapping(mapping_elem, &mapping_doc_path, connections);
                    nodes.extend(mb.nodes);
                    edges.extend(mb.edges);
                }

                batches.push((nodes, edges));
            }
        }

        batches
    }
}

fn find_mapping<'a>(
    mapping_docs: &'a HashMap<String, xmltree::XmlElement>,
    own_doc: &'a xmltree::XmlElement,
    mapping_name: &str,
) -> Option<(String, &'a xmltree::XmlElement)> {
    let mut own_mappings = Vec::new();
    own_doc.find_all_descendants("MAPPING", &mut own_mappings);
    if let Some(found) = own_mappings.into_iter().find(|m| m.attr("NAME") == Some(mapping_name)) {
        return Some(("(inline)".to_string(), found));
    }
    for (path, doc) in mapping_docs {
        let mut mappings = Vec::new();
        doc.find_all_descendants("MAPPING", &mut mappings);
        if let Some(found) = mappings.into_iter().find(|m| m.attr("NAME") == Some(mapping_name)) {
            return Some((path.clone(), found));
        }
    }
    None
}

fn read_doc(path: &Path) -> Option<xmltree::XmlElement> {
    let xml = match source::read_xml_file(path) {
        Ok(xml) => xml,
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "failed to read Informatica export, skipping");
            return None;
        }
    };
    match xmltree::parse(&xml) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::error!(file = %path.display(), error = %e, "malformed Informatica export XML, skipping");
            None
        }
    }
}

fn is_xml_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("xml")
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
    use etlgraph_core::{EdgeKind, NodeKind};
    use std::fs;

    const WORKFLOW_XML: &str = r#"<?xml version="1.0"?>
<POWERMART>
  <REPOSITORY>
    <FOLDER>
      <WORKFLOW NAME="wf_Load_Customers">
        <TASKINSTANCE NAME="s_m_Load_Customers" TASKTYPE="Session"/>
        <SESSION NAME="s_m_Load_Customers" MAPPINGNAME="m_Load_Customers">
          <CONNECTIONREFERENCE SESSIONINSTANCENAME="SQ_Customers" CONNECTIONNAME="ORA_SRC"/>
        </SESSION>
      </WORKFLOW>
    </FOLDER>
  </REPOSITORY>
</POWERMART>"#;

    const MAPPING_XML: &str = r#"<?xml version="1.0"?>
<POWERMART>
  <REPOSITORY>
    <FOLDER>
      <MAPPING NAME="m_Load_Customers">
        <SOURCE NAME="CUSTOMERS">
          <SOURCEFIELD NAME="ID" DATATYPE="number" PRECISION="10" SCALE="0"/>
        </SOURCE>
        <TARGET NAME="DIM_CUSTOMERS">
          <TARGETFIELD NAME="ID" DATATYPE="number" PRECISION="10" SCALE="0"/>
        </TARGET>
        <TRANSFORMATION NAME="SQ_Customers" TYPE="Source Qualifier">
          <TABLEATTRIBUTE NAME="Sql Query" VALUE="SELECT ID FROM CUSTOMERS"/>
        </TRANSFORMATION>
        <INSTANCE NAME="SQ_Customers" TRANSFORMATION_TYPE="Source Qualifier"/>
        <CONNECTOR FROMINSTANCE="CUSTOMERS" FROMINSTANCETYPE="SOURCE" TOINSTANCE="SQ_Customers" TOINSTANCETYPE="Source Qualifier" FROMFIELD="ID" TOFIELD="ID"/>
        <CONNECTOR FROMINSTANCE="SQ_Customers" FROMINSTANCETYPE="Source Qualifier" TOINSTANCE="DIM_CUSTOMERS" TOINSTANCETYPE="Target Definition" FROMFIELD="ID" TOFIELD="ID"/>
      </MAPPING>
    </FOLDER>
  </REPOSITORY>
</POWERMART>"#;

    #[test]
    fn empty_root_yields_no_batches() {
        let dir = tempfile::tempdir().unwrap();
        let tool = InformaticaIngestionTool::new(dir.path(), None);
        assert!(tool.ingest().is_empty());
    }

    #[test]
    fn workflow_and_mapping_pair_produces_expected_graph() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wf_Load_Customers.xml"), WORKFLOW_XML).unwrap();
        fs::write(dir.path().join("m_Load_Customers_MAPPING.xml"), MAPPING_XML).unwrap();

        let tool = InformaticaIngestionTool::new(dir.path(), None);
        let batches = tool.ingest();
        let all_nodes: Vec<Node> = batches.iter().flat_map(|(n, _)| n.clone()).collect();
        let all_edges: Vec<Edge> = batches.iter().flat_map(|(_, e)| e.clone()).collect();

        assert!(all_nodes.iter().any(|n| n.id == "pipeline:wf_Load_Customers"));
        assert!(all_nodes
            .iter()
            .any(|n| n.id == "pipeline:wf_Load_Customers/operation:s_m_Load_Customers"));
        assert!(all_nodes.iter().any(|n| n.id == "data_asset:source:CUSTOMERS"));
        assert!(all_nodes.iter().any(|n| n.id == "data_asset:target:DIM_CUSTOMERS"));
        assert!(all_nodes
            .iter()
            .any(|n| n.id == "operation:SQ_Customers" && n.kind == NodeKind::Operation));

        assert!(all_edges.iter().any(|e| e.relation == EdgeKind::ReadsFrom
            && e.source_id == "operation:SQ_Customers"
            && e.target_id == "data_asset:source:CUSTOMERS"));
        assert!(all_edges.iter().any(|e| e.relation == EdgeKind::WritesTo
            && e.source_id == "operation:SQ_Customers"
            && e.target_id == "data_asset:target:DIM_CUSTOMERS"));
    }

    #[test]
    fn missing_mapping_file_still_yields_workflow_nodes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("wf_Load_Customers.xml"), WORKFLOW_XML).unwrap();

        let tool = InformaticaIngestionTool::new(dir.path(), None);
        let batches = tool.ingest();
        let all_nodes: Vec<Node> = batches.iter().flat_map(|(n, _)| n.clone()).collect();
        assert!(all_nodes.iter().any(|n| n.id == "pipeline:wf_Load_Customers"));
        assert!(!all_nodes.iter().any(|n| n.id.starts_with("data_asset:")));
    }
}
