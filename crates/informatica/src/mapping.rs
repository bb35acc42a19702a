//! Mapping pass (C5): `SOURCE`/`TARGET` data assets, `INSTANCE` dispatch via
//! [`crate::transformations`], and the `CONNECTOR` edge pass.

use crate::transformations::extract;
use etlgraph_core::{Edge, EdgeKind, Node, NodeKind, SourceContext};
use etlgraph_ssis::xmltree::XmlElement;
use etlgraph_typemap::informatica_mapper;
use serde_json::json;
use std::collections::HashMap;

pub struct MappingBatch {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// `session_connections` maps this mapping's instance name to the
/// connection name resolved from the owning session, if any — used to
/// enrich lookup/joiner instances with their effective connection.
pub fn parse_mapping(
    mapping: &XmlElement,
    source_file_path: &str,
    session_connections: &HashMap<String, String>,
) -> MappingBatch {
    let mapper = informatica_mapper();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for source in mapping.children_named("SOURCE") {
        let name = source.attr("NAME").unwrap_or("UnnamedSource");
        let id = format!("data_asset:source:{name}");
        let fields: Vec<_> = source
            .children_named("SOURCEFIELD")
            .map(|f| {
                let enriched = mapper.enrich(
                    f.attr("DATATYPE").unwrap_or("string"),
                    f.attr("LENGTH").and_then(|v| v.parse().ok()),
                    f.attr("PRECISION").and_then(|v| v.parse().ok()),
                    f.attr("SCALE").and_then(|v| v.parse().ok()),
                    f.attr("NULLABLE").map(|v| v.eq_ignore_ascii_case("yes")),
                    &[],
                );
                json!({"name": f.attr("NAME").unwrap_or(""), "type": enriched})
            })
            .collect();
        let ctx = SourceContext::xml_metadata(source_file_path, "MAPPING/SOURCE", None, "informatica");
        nodes.push(
            Node::new(id, NodeKind::DataAsset, name)
                .with_property("asset_role", json!("source"))
                .with_property("fields", json!(fields))
                .with_context(ctx),
        );
    }

    for target in mapping.children_named("TARGET") {
        let name = target.attr("NAME").unwrap_or("UnnamedTarget");
        let id = format!("data_asset:target:{name}");
        let fields: Vec<_> = target
            .children_named("TARGETFIELD")
            .map(|f| {
                let enriched = mapper.enrich(
                    f.attr("DATATYPE").unwrap_or("string"),
                    f.attr("LENGTH").and_then(|v| v.parse().ok()),
                    f.attr("PRECISION").and_then(|v| v.parse().ok()),
                    f.attr("SCALE").and_then(|v| v.parse().ok()),
                    f.attr("NULLABLE").map(|v| v.eq_ignore_ascii_case("yes")),
                    &[],
                );
                json!({"name": f.attr("NAME").unwrap_or(""), "type": enriched})
            })
            .collect();
        let ctx = SourceContext::xml_metadata(source_file_path, "MAPPING/TARGET", None, "informatica");
        nodes.push(
            Node::new(id, NodeKind::DataAsset, name)
                .with_property("asset_role", json!("target"))
                .with_property("fields", json!(fields))
                .with_context(ctx),
        );
    }

    // Cache transformation definitions by name for the INSTANCE dispatch.
    let defs: HashMap<&str, &XmlElement> = mapping
        .children_named("TRANSFORMATION")
        .filter_map(|t| t.attr("NAME").map(|n| (n, t)))
        .collect();

    let mut instance_ids: HashMap<String, String> = HashMap::new();

    for instance in mapping.children_named("INSTANCE") {
        let name = instance.attr("NAME").unwrap_or("UnnamedInstance").to_string();
        let transformation_type = instance
            .attr("TRANSFORMATION_TYPE")
            .or_else(|| instance.attr("TYPE"))
            .unwrap_or("")
            .to_string();
        let instance_id = format!("operation:{name}");
        instance_ids.insert(name.clone(), instance_id.clone());

        let def = defs.get(name.as_str()).copied().unwrap_or(instance);
        let result = extract(&transformation_type, def, &instance_id);

        let ctx = SourceContext::xml_metadata(source_file_path, "MAPPING/INSTANCE", None, "informatica");
        let mut node = Node::new(instance_id, NodeKind::Operation, name.clone())
            .with_property("operation_subtype", json!("DATA_FLOW"))
            .with_property("native_type", json!(transformation_type))
            .with_context(ctx);
        for (k, v) in result.properties {
            node.set_property(k, v);
        }
        if let Some(connection) = session_connections.get(&name) {
            node.set_property("resolved_connection", json!(connection));
        }
        nodes.push(node);
        edges.extend(result.edges);
    }

    let instance_id_of = |name: &str| {
        instance_ids.get(name).cloned().unwrap_or_else(|| format!("operation:{name}"))
    };

    for connector in mapping.children_named("CONNECTOR") {
        let from_name = connector.attr("FROMINSTANCE").unwrap_or("");
        let to_name = connector.attr("TOINSTANCE").unwrap_or("");
        let from_type = connector.attr("FROMINSTANCETYPE").unwrap_or("");
        let to_type = connector.attr("TOINSTANCETYPE").unwrap_or("");

        let from_is_source = from_type.eq_ignore_ascii_case("source") || from_type.starts_with("Source");
        let to_is_target = to_type == "Target Definition"
            || to_type.eq_ignore_ascii_case("target")
            || to_type.starts_with("Target");

        let (from_id, to_id, relation) = if from_is_source {
            (
                instance_id_of(to_name),
                format!("data_asset:source:{from_name}"),
                EdgeKind::ReadsFrom,
            )
        } else if to_is_target {
            (
                instance_id_of(from_name),
                format!("data_asset:target:{to_name}"),
                EdgeKind::WritesTo,
            )
        } else {
            (instance_id_of(from_name), instance_id_of(to_name), EdgeKind::DependsOn)
        };

        edges.push(
            Edge::new(from_id, to_id, relation)
                .with_property("from_field", json!(connector.attr("FROMFIELD")))
                .with_property("to_field", json!(connector.attr("TOFIELD"))),
        );
    }

    MappingBatch { nodes, edges }
}
