//! Per-package assembly (C4 step 1): ties the connection/parameter/variable
//! pre-passes together with the executable walk and precedence-constraint
//! extraction into one `(Vec<Node>, Vec<Edge>)` batch per `.dtsx` file.

use crate::connection::{parse_connection_manager, ConnectionRegistry};
use crate::expr::scan;
use crate::operations::walk_executables;
use crate::parameters::{strip_braces, ProjectParameter};
use crate::precedence::extract_precedence_edges;
use crate::variables::parse_variables;
use crate::xmltree::XmlElement;
use etlgraph_core::{Edge, EdgeKind, Node, NodeKind, SourceContext};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

/// One package's contribution to the graph, plus bookkeeping the caller
/// (the ingestion tool) needs to resolve tables across files.
pub struct PackageBatch {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Every `table:<schema.name>` id referenced by this package, so the
    /// ingestion tool can emit one `table` node per distinct id across the
    /// whole run (step 6: "created once").
    pub referenced_tables: Vec<String>,
    /// Best-effort platform hint for tables this package references: the
    /// first connection manager's detected platform, if any were declared.
    pub table_platform_hint: Option<&'static str>,
}

/// Parses one already-loaded `.dtsx` document. `project_parameters` is the
/// read-only project-parameter pre-pass result (by id, so SQL-task
/// `ParameterMapping` GUID lookups can match either project or package
/// parameters).
pub fn parse_package(
    doc: &XmlElement,
    source_file_path: &str,
    project_parameters: &[ProjectParameter],
) -> PackageBatch {
    let package = doc.find_descendant("Executable").filter(|e| e.tag.ends_with("Package"));
    let package = package.or_else(|| doc.children.iter().find(|c| c.local_name() == "Executable"));
    let package = match package {
        Some(p) => p,
        None => doc, // tolerate a document whose root *is* the package element
    };

    let package_name = package
        .attr("DTS:ObjectName")
        .or_else(|| package.attr("ObjectName"))
        .unwrap_or_else(|| {
            Path::new(source_file_path)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UnnamedPackage")
        })
        .to_string();

    let pipeline_id = format!("pipeline:{package_name}");
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    let context = SourceContext::xml_metadata(source_file_path, "DTS:Executable", None, "ssis");
    nodes.push(
        Node::new(pipeline_id.clone(), NodeKind::Pipeline, package_name.clone())
            .with_property("technology", json!("ssis"))
            .with_context(context),
    );

    // Local connection managers, embedded directly or referenced by the
    // package's own `DTS:ConnectionManagers` collection.
    let mut connections = ConnectionRegistry::default();
    let mut connection_ids = Vec::new();
    if let Some(conn_mgrs) = package.child_named("ConnectionManagers") {
        for cm_elem in conn_mgrs.children_named("ConnectionManager") {
            let cm = parse_connection_manager(cm_elem);
            connection_ids.push(cm.id());
            nodes.push(cm.to_node(source_file_path));
            connections.insert(cm);
        }
    }

    // Package-level parameters (distinct from project parameters, same shape).
    let mut parameter_ids: Vec<String> = project_parameters.iter().map(|p| p.id()).collect();
    let mut parameter_guids: HashMap<String, String> = project_parameters
        .iter()
        .filter(|p| !p.dtsid.is_empty())
        .map(|p| (p.dtsid.clone(), p.id()))
        .collect();
    if let Some(params_elem) = package.child_named("PackageParameters") {
        for p_elem in params_elem.children_named("PackageParameter") {
            let name = p_elem
                .attr("DTS:ObjectName")
                .or_else(|| p_elem.attr("ObjectName"))
                .unwrap_or("UnnamedParameter");
            let id = format!("parameter:{name}");
            parameter_ids.push(id.clone());
            if let Some(dtsid) = p_elem.attr("DTS:DTSID").or_else(|| p_elem.attr("DTSID")) {
                parameter_guids.insert(strip_braces(dtsid), id.clone());
            }
            let value = p_elem
                .find_descendant("ParameterValue")
                .map(|e| e.text.clone())
                .unwrap_or_default();
            let data_type = p_elem
                .attr("DTS:DataType")
                .or_else(|| p_elem.attr("DataType"))
                .unwrap_or("String");
            let ctx = SourceContext::xml_metadata(source_file_path, "DTS:PackageParameter", None, "ssis");
            nodes.push(
                Node::new(id, NodeKind::Parameter, name)
                    .with_property("value", json!(value))
                    .with_property("data_type", json!(data_type))
                    .with_context(ctx),
            );
        }
    }

    let variables = parse_variables(package);
    let variable_ids: Vec<String> = variables.iter().map(|v| v.id()).collect();
    let variable_guids: HashMap<String, String> = variables
        .iter()
        .filter(|v| !v.dtsid.is_empty())
        .map(|v| (v.dtsid.clone(), v.id()))
        .collect();
    for v in &variables {
        nodes.push(v.to_node(source_file_path));
    }

    for id in &connection_ids {
        edges.push(Edge::new(pipeline_id.clone(), id.clone(), EdgeKind::UsesConnection));
    }

    let walk = walk_executables(
        package,
        &pipeline_id,
        &package_name,
        source_file_path,
        &connections,
        &variable_ids,
        &parameter_ids,
        &variable_guids,
        &parameter_guids,
    );
    nodes.extend(walk.nodes);
    edges.extend(walk.edges);

    edges.extend(extract_precedence_edges(package, &walk.path_to_id));

    // Expression-language dependency extraction (step 4): scan every
    // connection string for embedded references too, since those were
    // already resolved during the connection pre-pass above; here we cover
    // package-level text the operations walk doesn't already scan (e.g. the
    // package's own property sheet is out of scope — the operations walk
    // covers SQL/expression text per task).
    for cm in connections.by_name.values() {
        let refs = scan(&cm.connection_string);
        for var in &refs.variables {
            let id = format!("variable:User.{var}");
            if variable_ids.contains(&id) {
                edges.push(Edge::new(pipeline_id.clone(), id, EdgeKind::UsesVariable));
            }
        }
        for param in &refs.parameters {
            let id = format!("parameter:{param}");
            if parameter_ids.contains(&id) {
                edges.push(Edge::new(pipeline_id.clone(), id, EdgeKind::UsesParameter));
            }
        }
    }

    let referenced_tables: Vec<String> = edges
        .iter()
        .filter(|e| matches!(e.relation, EdgeKind::ReadsFrom | EdgeKind::WritesTo))
        .map(|e| e.target_id.clone())
        .filter(|id| id.starts_with("table:"))
        .collect();

    let table_platform_hint = connections.by_name.values().next().map(|c| c.platform);

    PackageBatch {
        nodes,
        edges,
        referenced_tables,
        table_platform_hint,
    }
}
