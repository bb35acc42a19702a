//! `DTS:Variable` nodes, namespaced (defaults to `User`).

use crate::xmltree::XmlElement;
use etlgraph_core::{Node, NodeKind, SourceContext};
use serde_json::json;

pub struct SsisVariable {
    pub namespace: String,
    pub name: String,
    pub data_type: String,
    pub value: String,
    /// `DTS:DTSID`, braces stripped; empty when the element carries none.
    pub dtsid: String,
}

impl SsisVariable {
    pub fn id(&self) -> String {
        format!("variable:{}.{}", self.namespace, self.name)
    }

    pub fn to_node(&self, source_file_path: &str) -> Node {
        let context = SourceContext::xml_metadata(source_file_path, "DTS:Variable", None, "ssis");
        Node::new(self.id(), NodeKind::Variable, self.name.clone())
            .with_property("namespace", json!(self.namespace))
            .with_property("data_type", json!(self.data_type))
            .with_property("value", json!(self.value))
            .with_context(context)
    }
}

pub fn parse_variables(package: &XmlElement) -> Vec<SsisVariable> {
    let Some(variables_elem) = package.child_named("Variables") else {
        return Vec::new();
    };

    variables_elem
        .children_named("Variable")
        .map(|v| {
            let namespace = v
                .attr("DTS:Namespace")
                .or_else(|| v.attr("Namespace"))
                .unwrap_or("User")
                .to_string();
            let name = v
                .attr("DTS:ObjectName")
                .or_else(|| v.attr("ObjectName"))
                .unwrap_or("UnnamedVariable")
                .to_string();
            let data_type = v
                .attr("DTS:DataType")
                .or_else(|| v.attr("DataType"))
                .unwrap_or("String")
                .to_string();
            let value = v
                .find_descendant("VariableValue")
                .map(|e| e.text.clone())
                .unwrap_or_default();
            let dtsid = v
                .attr("DTS:DTSID")
                .or_else(|| v.attr("DTSID"))
                .map(crate::parameters::strip_braces)
                .unwrap_or_default();
            SsisVariable {
                namespace,
                name,
                data_type,
                value,
                dtsid,
            }
        })
        .collect()
}
