//! `DTS:Executables` walk: operation nodes, `contains` edges, and dispatch
//! by task kind (C4 step 2-3).

use crate::connection::ConnectionRegistry;
use crate::dataflow::{classify, extract_rules};
use crate::expr::scan;
use crate::script_task::analyze_script_task;
use crate::sql_task::{count_placeholders, extract_sql_and_mapping, extract_table_references, parse_parameter_mapping, SqlStatementType};
use crate::xmltree::XmlElement;
use etlgraph_core::{Edge, EdgeKind, Node, NodeKind, SourceContext};
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationSubtype {
    ControlFlow,
    DataFlow,
    Execute,
    Script,
}

impl OperationSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationSubtype::ControlFlow => "CONTROL_FLOW",
            OperationSubtype::DataFlow => "DATA_FLOW",
            OperationSubtype::Execute => "EXECUTE",
            OperationSubtype::Script => "SCRIPT",
        }
    }
}

/// `Microsoft.Pipeline → DATA_FLOW`; `STOCK:FORLOOP|FOREACHLOOP|SEQUENCE →
/// CONTROL_FLOW`; `Microsoft.ExecuteSQLTask|FileSystemTask → EXECUTE`;
/// `Microsoft.ScriptTask → SCRIPT`; unknown → `EXECUTE` with a warning.
fn classify_subtype(executable_type: &str) -> OperationSubtype {
    match executable_type {
        "Microsoft.Pipeline" => OperationSubtype::DataFlow,
        "STOCK:FORLOOP" | "STOCK:FOREACHLOOP" | "STOCK:SEQUENCE" => OperationSubtype::ControlFlow,
        "Microsoft.ExecuteSQLTask" | "Microsoft.FileSystemTask" | "FileSystemTask" => OperationSubtype::Execute,
        "Microsoft.ScriptTask" => OperationSubtype::Script,
        other => {
            tracing::warn!(executable_type = other, "unrecognized SSIS executable type, defaulting to EXECUTE");
            OperationSubtype::Execute
        }
    }
}

pub struct WalkResult {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Executable path (`Package\Container\Task`) → generated operation id,
    /// used to resolve `DTS:PrecedenceConstraint` `From`/`To` attributes.
    pub path_to_id: HashMap<String, String>,
}

#[allow(clippy::too_many_arguments)]
pub fn walk_executables(
    package: &XmlElement,
    pipeline_id: &str,
    package_name: &str,
    source_file_path: &str,
    connections: &ConnectionRegistry,
    variable_ids: &[String],
    parameter_ids: &[String],
    variable_guids: &HashMap<String, String>,
    parameter_guids: &HashMap<String, String>,
) -> WalkResult {
    let mut result = WalkResult {
        nodes: Vec::new(),
        edges: Vec::new(),
        path_to_id: HashMap::new(),
    };

    let Some(executables) = package.child_named("Executables") else {
        return result;
    };

    for exe in executables.children_named("Executable") {
        walk_one(
            exe,
            pipeline_id,
            pipeline_id,
            package_name,
            source_file_path,
            connections,
            variable_ids,
            parameter_ids,
            variable_guids,
            parameter_guids,
            &mut result,
        );
    }

    result
}

#[allow(clippy::too_many_arguments)]
fn walk_one(
    exe: &XmlElement,
    container_id: &str,
    package_id: &str,
    path_prefix: &str,
    source_file_path: &str,
    connections: &ConnectionRegistry,
    variable_ids: &[String],
    parameter_ids: &[String],
    variable_guids: &HashMap<String, String>,
    parameter_guids: &HashMap<String, String>,
    result: &mut WalkResult,
) {
    let task_name = exe
        .attr("DTS:ObjectName")
        .or_else(|| exe.attr("ObjectName"))
        .unwrap_or("UnnamedTask")
        .to_string();
    let executable_type = exe
        .attr("DTS:ExecutableType")
        .or_else(|| exe.attr("ExecutableType"))
        .unwrap_or("")
        .to_string();

    let subtype = classify_subtype(&executable_type);
    let op_id = format!("{container_id}/operation:{task_name}");
    let path = format!("{path_prefix}\\{task_name}");
    result.path_to_id.insert(path.clone(), op_id.clone());

    let context = SourceContext::xml_metadata(source_file_path, "DTS:Executable", None, "ssis");
    let mut node = Node::new(op_id.clone(), NodeKind::Operation, task_name.clone())
        .with_property("operation_subtype", json!(subtype.as_str()))
        .with_property("native_type", json!(executable_type))
        .with_context(context);

    match subtype {
        OperationSubtype::DataFlow => {
            let (extra_nodes, extra_edges) = parse_data_flow(exe, &op_id, source_file_path, connections);
            result.nodes.extend(extra_nodes);
            result.edges.extend(extra_edges);
        }
        OperationSubtype::Execute if executable_type == "Microsoft.ExecuteSQLTask" => {
            let (sql, mapping) = extract_sql_and_mapping(exe);
            if !sql.is_empty() {
                let statement_type = SqlStatementType::classify(&sql);
                node.set_property("sql_command", json!(sql));
                node.set_property("sql_statement_type", json!(statement_type.as_str()));
                let tables = extract_table_references(&sql);
                node.set_property("placeholder_count", json!(count_placeholders(&sql)));

                for table in &tables {
                    let table_id = format!("table:{table}");
                    let relation = match statement_type {
                        SqlStatementType::Select => EdgeKind::ReadsFrom,
                        _ => EdgeKind::WritesTo,
                    };
                    result.edges.push(Edge::new(op_id.clone(), table_id, relation));
                }

                let semantics = etlgraph_sql::parse(&sql);
                for join_edge in etlgraph_sql::join_edges(&semantics) {
                    result.edges.push(join_edge);
                }

                if count_placeholders(&sql) > 0 {
                    if let Some(mapping) = mapping {
                        for entry in parse_parameter_mapping(&mapping) {
                            if let Some(id) = parameter_guids.get(&entry.guid) {
                                result.edges.push(Edge::new(op_id.clone(), id.clone(), EdgeKind::UsesParameter));
                            } else if let Some(id) = variable_guids.get(&entry.guid) {
                                result.edges.push(Edge::new(op_id.clone(), id.clone(), EdgeKind::UsesVariable));
                            }
                        }
                    }
                }

                let refs = scan(&sql);
                for var in refs.variables {
                    result.edges.push(Edge::new(op_id.clone(), format!("variable:User.{var}"), EdgeKind::UsesVariable));
                }
                for param in refs.parameters {
                    result.edges.push(Edge::new(op_id.clone(), format!("parameter:{param}"), EdgeKind::UsesParameter));
                }
            }
        }
        OperationSubtype::Script => {
            let analysis = analyze_script_task(exe);
            node.set_property("script_language", json!(analysis.language));
            node.set_property("vsta_version", json!(analysis.vsta_version));
            node.set_property("entry_point", json!(analysis.entry_point));
            node.set_property("read_only_variables", json!(analysis.read_only_variables));
            node.set_property("read_write_variables", json!(analysis.read_write_variables));
            node.set_property("complexity", json!(analysis.complexity));
            node.set_property("frameworks", json!(analysis.frameworks));
        }
        _ => {}
    }

    result.nodes.push(node);
    result.edges.push(Edge::new(container_id, op_id.clone(), EdgeKind::Contains));

    if let Some(nested) = exe.find_descendant("Executables") {
        for child_exe in nested.children_named("Executable") {
            walk_one(
                child_exe,
                &op_id,
                package_id,
                &path,
                source_file_path,
                connections,
                variable_ids,
                parameter_ids,
                variable_guids,
                parameter_guids,
                result,
            );
        }
    }
}

fn parse_data_flow(exe: &XmlElement, operation_id: &str, source_file_path: &str, connections: &ConnectionRegistry) -> (Vec<Node>, Vec<Edge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    let Some(pipeline) = exe.find_descendant("pipeline") else {
        return (nodes, edges);
    };
    let Some(components) = pipeline.find_descendant("components") else {
        return (nodes, edges);
    };

    for component in components.children_named("component") {
        let comp_name = component.attr("name").unwrap_or("UnnamedComponent").to_string();
        let class_id = component.attr("componentClassID").unwrap_or("").to_string();
        let classification = classify(&class_id);

        let comp_id = format!("{operation_id}/operation:{comp_name}");
        let context = SourceContext::xml_metadata(source_file_path, "DTS:ObjectData/pipeline/components/component", None, "ssis");
        let mut node = Node::new(comp_id.clone(), NodeKind::Operation, comp_name)
            .with_property("operation_subtype", json!("DATA_FLOW"))
            .with_property("component_class_id", json!(class_id))
            .with_property("component_classification", json!(classification.as_str()))
            .with_context(context);

        let (props, rule_edges) = extract_rules(component, classification, &class_id, &comp_id, connections);
        for (key, value) in props {
            node.set_property(key, value);
        }
        edges.extend(rule_edges);

        nodes.push(node);
        edges.push(Edge::new(operation_id, comp_id, EdgeKind::Contains));
    }

    (nodes, edges)
}
