//! Project-parameter pre-pass (C4): `Project.params` and friends.

use crate::xmltree::XmlElement;
use etlgraph_core::{Node, NodeKind, SourceContext};
use serde_json::json;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ProjectParameter {
    pub name: String,
    pub value: String,
    pub data_type: String,
    pub required: bool,
    /// `DTS:DTSID`, braces stripped; empty when the element carries none.
    /// This is what Execute-SQL `ParameterMapping` GUIDs resolve against,
    /// since that mapping references parameters/variables by id, not name.
    pub dtsid: String,
}

impl ProjectParameter {
    pub fn id(&self) -> String {
        format!("parameter:{}", self.name)
    }

    pub fn to_node(&self, source_file_path: &str) -> Node {
        let context =
            SourceContext::xml_metadata(source_file_path, "DTS:PackageParameter", None, "ssis");
        Node::new(self.id(), NodeKind::Parameter, self.name.clone())
            .with_property("value", json!(self.value))
            .with_property("data_type", json!(self.data_type))
            .with_property("required", json!(self.required))
            .with_context(context)
    }
}

fn parse_one(elem: &XmlElement) -> ProjectParameter {
    let name = elem
        .attr("DTS:ObjectName")
        .or_else(|| elem.attr("ObjectName"))
        .unwrap_or("UnnamedParameter")
        .to_string();
    let data_type = elem
        .attr("DTS:DataType")
        .or_else(|| elem.attr("DataType"))
        .unwrap_or("String")
        .to_string();
    let required = elem
        .attr("DTS:Required")
        .or_else(|| elem.attr("Required"))
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let value = elem
        .property_text("ParameterValue")
        .or_else(|| elem.find_descendant("ParameterValue").map(|e| e.text.as_str()))
        .unwrap_or("")
        .to_string();
    let dtsid = elem
        .attr("DTS:DTSID")
        .or_else(|| elem.attr("DTSID"))
        .map(strip_braces)
        .unwrap_or_default();

    ProjectParameter {
        name,
        value,
        data_type,
        required,
        dtsid,
    }
}

pub(crate) fn strip_braces(raw: &str) -> String {
    raw.trim_start_matches('{').trim_end_matches('}').to_string()
}

/// Parses a `Project.params`-style file; a document may declare several
/// `DTS:PackageParameter` elements.
pub fn parse_project_params(path: &Path) -> Vec<ProjectParameter> {
    let Ok(xml) = crate::source::read_xml_file(path) else {
        return Vec::new();
    };
    let Ok(doc) = crate::xmltree::parse(&xml) else {
        return Vec::new();
    };

    let mut elems = Vec::new();
    doc.find_all_descendants("PackageParameter", &mut elems);
    if elems.is_empty() {
        doc.find_all_descendants("Parameter", &mut elems);
    }
    elems.into_iter().map(parse_one).collect()
}
