//! Workflow pass (C5): one `pipeline` per `WORKFLOW`, one `operation` per
//! `TASKINSTANCE`, `WORKFLOWLINK` edges, and the session connection-instance
//! cache later mapping parsing needs.

use etlgraph_core::{Edge, EdgeKind, Node, NodeKind, SourceContext};
use etlgraph_ssis::xmltree::XmlElement;
use serde_json::json;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSubtype {
    ControlFlow,
    Execute,
    DataFlow,
}

impl TaskSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskSubtype::ControlFlow => "CONTROL_FLOW",
            TaskSubtype::Execute => "EXECUTE",
            TaskSubtype::DataFlow => "DATA_FLOW",
        }
    }
}

/// `Command`/`Email` take priority as `EXECUTE` over the broader
/// `CONTROL_FLOW` group the spec also lists them under; everything else in
/// the control-flow group (Session/Worklet/Assignment/Timer/Event-Wait)
/// stays `CONTROL_FLOW`, and any other task kind is `DATA_FLOW`.
fn classify_task(task_type: &str) -> TaskSubtype {
    match task_type {
        "Command" | "Email" => TaskSubtype::Execute,
        "Session" | "Worklet" | "Assignment" | "Timer" | "Event-Wait" | "Event Wait" => {
            TaskSubtype::ControlFlow
        }
        _ => TaskSubtype::DataFlow,
    }
}

/// Caches, per workflow, which mapping each session runs and which
/// connection each of that mapping's instances resolves to — built from a
/// `SESSION`'s `CONNECTIONREFERENCE` children (or the looser
/// `SESSIONEXTENSION`/`ATTRIBUTE` shape some exports use).
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    /// mapping name -> (connection instance name -> connection name)
    pub mapping_connections: HashMap<String, HashMap<String, String>>,
    /// session task-instance name -> mapping name
    pub session_mapping: HashMap<String, String>,
}

pub struct WorkflowBatch {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub pipeline_id: String,
    pub sessions: SessionRegistry,
}

pub fn parse_workflow(workflow: &XmlElement, source_file_path: &str) -> WorkflowBatch {
    let name = workflow.attr("NAME").unwrap_or("UnnamedWorkflow").to_string();
    let pipeline_id = format!("pipeline:{name}");

    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    let ctx = SourceContext::xml_metadata(source_file_path, "WORKFLOW", None, "informatica");
    nodes.push(
        Node::new(pipeline_id.clone(), NodeKind::Pipeline, name.clone())
            .with_property("technology", json!("informatica"))
            .with_context(ctx),
    );

    let mut task_ids: HashMap<String, String> = HashMap::new();
    for task in workflow.children_named("TASKINSTANCE") {
        let task_name = task.attr("NAME").unwrap_or("UnnamedTask").to_string();
        let task_type = task
            .attr("TASKTYPE")
            .or_else(|| task.attr("TASKINSTANCETYPE"))
            .unwrap_or("")
            .to_string();
        let subtype = classify_task(&task_type);
        let op_id = format!("{pipeline_id}/operation:{task_name}");
        task_ids.insert(task_name.clone(), op_id.clone());

        let ctx = SourceContext::xml_metadata(source_file_path, "TASKINSTANCE", None, "informatica");
        nodes.push(
            Node::new(op_id.clone(), NodeKind::Operation, task_name)
                .with_property("operation_subtype", json!(subtype.as_str()))
                .with_property("native_type", json!(task_type))
                .with_context(ctx),
        );
        edges.push(Edge::new(pipeline_id.clone(), op_id, EdgeKind::Contains));
    }

    for link in workflow.children_named("WORKFLOWLINK") {
        let from = link.attr("FROMTASK");
        let to = link.attr("TOTASK");
        let (Some(from), Some(to)) = (from, to) else { continue };
        let (Some(from_id), Some(to_id)) = (task_ids.get(from), task_ids.get(to)) else {
            tracing::debug!(from, to, "workflow link endpoint not found, dropping edge");
            continue;
        };
        let condition = link.attr("CONDITION").unwrap_or("");
        edges.push(
            Edge::new(from_id.clone(), to_id.clone(), EdgeKind::DependsOn)
                .with_property("link_condition", json!(condition)),
        );
    }

    let mut sessions = SessionRegistry::default();
    for session in workflow.children_named("SESSION") {
        let session_name = session.attr("NAME").unwrap_or("").to_string();
        let mapping_name = session.attr("MAPPINGNAME").unwrap_or("").to_string();
        if mapping_name.is_empty() {
            continue;
        }
        sessions.session_mapping.insert(session_name, mapping_name.clone());

        let entry = sessions.mapping_connections.entry(mapping_name).or_default();
        for ext in session.children_named("SESSIONEXTENSION") {
            for conn_ref in ext.children_named("CONNECTIONREFERENCE") {
                insert_connection_ref(entry, conn_ref);
            }
        }
        for conn_ref in session.children_named("CONNECTIONREFERENCE") {
            insert_connection_ref(entry, conn_ref);
        }
    }

    WorkflowBatch {
        nodes,
        edges,
        pipeline_id,
        sessions,
    }
}

fn insert_connection_ref(entry: &mut HashMap<String, String>, conn_ref: &XmlElement) {
    let instance = conn_ref
        .attr("SESSIONINSTANCENAME")
        .or_else(|| conn_ref.attr("INSTANCENAME"));
    let connection = conn_ref
        .attr("CONNECTIONNAME")
        .or_else(|| conn_ref.attr("CONNECTIONREFERENCENAME"));
    if let (Some(instance), Some(connection)) = (instance, connection) {
        entry.insert(instance.to_string(), connection.to_string());
    }
}
