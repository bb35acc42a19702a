//! Canonical node/edge data model for the ETL knowledge graph.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown kind: {0}")]
    UnknownKind(String),
}

/// Closed set of node kinds. Serializes to the exact snake_case strings the
/// spec's identifier grammar and wire format expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Directory,
    File,
    Pipeline,
    Operation,
    DataAsset,
    Connection,
    Parameter,
    Variable,
    Schema,
    Table,
    Column,
    Entity,
    Transformation,
    OperationSummary,
    PipelineSummary,
    MaterializedView,
    GraphMetadata,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Directory => "directory",
            NodeKind::File => "file",
            NodeKind::Pipeline => "pipeline",
            NodeKind::Operation => "operation",
            NodeKind::DataAsset => "data_asset",
            NodeKind::Connection => "connection",
            NodeKind::Parameter => "parameter",
            NodeKind::Variable => "variable",
            NodeKind::Schema => "schema",
            NodeKind::Table => "table",
            NodeKind::Column => "column",
            NodeKind::Entity => "entity",
            NodeKind::Transformation => "transformation",
            NodeKind::OperationSummary => "operation_summary",
            NodeKind::PipelineSummary => "pipeline_summary",
            NodeKind::MaterializedView => "materialized_view",
            NodeKind::GraphMetadata => "graph_metadata",
        }
    }

    /// True for `*_summary` kinds, which get extra token weight in the index.
    pub fn is_summary(&self) -> bool {
        matches!(self, NodeKind::OperationSummary | NodeKind::PipelineSummary)
    }
}

impl FromStr for NodeKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "directory" => Ok(NodeKind::Directory),
            "file" => Ok(NodeKind::File),
            "pipeline" => Ok(NodeKind::Pipeline),
            "operation" => Ok(NodeKind::Operation),
            "data_asset" => Ok(NodeKind::DataAsset),
            "connection" => Ok(NodeKind::Connection),
            "parameter" => Ok(NodeKind::Parameter),
            "variable" => Ok(NodeKind::Variable),
            "schema" => Ok(NodeKind::Schema),
            "table" => Ok(NodeKind::Table),
            "column" => Ok(NodeKind::Column),
            "entity" => Ok(NodeKind::Entity),
            "transformation" => Ok(NodeKind::Transformation),
            "operation_summary" => Ok(NodeKind::OperationSummary),
            "pipeline_summary" => Ok(NodeKind::PipelineSummary),
            "materialized_view" => Ok(NodeKind::MaterializedView),
            "graph_metadata" => Ok(NodeKind::GraphMetadata),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// Closed set of edge relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Contains,
    ReadsFrom,
    WritesTo,
    UsesConnection,
    UsesParameter,
    UsesVariable,
    Summarizes,
    Executes,
    DerivedFrom,
    Transforms,
    PartOf,
    References,
    Configures,
    Precedes,
    DependsOn,
    SharesResource,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::ReadsFrom => "reads_from",
            EdgeKind::WritesTo => "writes_to",
            EdgeKind::UsesConnection => "uses_connection",
            EdgeKind::UsesParameter => "uses_parameter",
            EdgeKind::UsesVariable => "uses_variable",
            EdgeKind::Summarizes => "summarizes",
            EdgeKind::Executes => "executes",
            EdgeKind::DerivedFrom => "derived_from",
            EdgeKind::Transforms => "transforms",
            EdgeKind::PartOf => "part_of",
            EdgeKind::References => "references",
            EdgeKind::Configures => "configures",
            EdgeKind::Precedes => "precedes",
            EdgeKind::DependsOn => "depends_on",
            EdgeKind::SharesResource => "shares_resource",
        }
    }
}

impl FromStr for EdgeKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contains" => Ok(EdgeKind::Contains),
            "reads_from" => Ok(EdgeKind::ReadsFrom),
            "writes_to" => Ok(EdgeKind::WritesTo),
            "uses_connection" => Ok(EdgeKind::UsesConnection),
            "uses_parameter" => Ok(EdgeKind::UsesParameter),
            "uses_variable" => Ok(EdgeKind::UsesVariable),
            "summarizes" => Ok(EdgeKind::Summarizes),
            "executes" => Ok(EdgeKind::Executes),
            "derived_from" => Ok(EdgeKind::DerivedFrom),
            "transforms" => Ok(EdgeKind::Transforms),
            "part_of" => Ok(EdgeKind::PartOf),
            "references" => Ok(EdgeKind::References),
            "configures" => Ok(EdgeKind::Configures),
            "precedes" => Ok(EdgeKind::Precedes),
            "depends_on" => Ok(EdgeKind::DependsOn),
            "shares_resource" => Ok(EdgeKind::SharesResource),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationMethod {
    XmlMetadata,
    SqlParsing,
    DataFlowAnalysis,
    Inference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Traceability envelope attached to every node/edge born of parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceContext {
    pub source_file_path: String,
    pub source_file_type: String,
    pub xml_path: Option<String>,
    pub line_number: Option<u32>,
    pub technology: String,
    pub derivation_method: DerivationMethod,
    pub confidence_level: ConfidenceLevel,
}

impl SourceContext {
    pub fn xml_metadata(
        source_file_path: impl Into<String>,
        xml_path: impl Into<String>,
        line_number: Option<u32>,
        technology: impl Into<String>,
    ) -> Self {
        SourceContext {
            source_file_path: source_file_path.into(),
            source_file_type: "xml".to_string(),
            xml_path: Some(xml_path.into()),
            line_number,
            technology: technology.into(),
            derivation_method: DerivationMethod::XmlMetadata,
            confidence_level: ConfidenceLevel::High,
        }
    }

    pub fn sql_parsing(source_file_path: impl Into<String>, technology: impl Into<String>) -> Self {
        SourceContext {
            source_file_path: source_file_path.into(),
            source_file_type: "xml".to_string(),
            xml_path: None,
            line_number: None,
            technology: technology.into(),
            derivation_method: DerivationMethod::SqlParsing,
            confidence_level: ConfidenceLevel::Medium,
        }
    }

    pub fn inference(source_file_path: impl Into<String>, technology: impl Into<String>) -> Self {
        SourceContext {
            source_file_path: source_file_path.into(),
            source_file_type: "xml".to_string(),
            xml_path: None,
            line_number: None,
            technology: technology.into(),
            derivation_method: DerivationMethod::Inference,
            confidence_level: ConfidenceLevel::Low,
        }
    }
}

/// A node in the canonical graph. `id` is the deterministic, human-readable
/// colon-delimited path described by the identifier grammar (e.g.
/// `pipeline:Q1/operation:DFT Load`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            kind,
            name: name.into(),
            properties: Map::new(),
            context: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_context(mut self, ctx: SourceContext) -> Self {
        if let Ok(Value::Object(map)) = serde_json::to_value(ctx).map(|v| v) {
            self.context = map;
        }
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Union-merge another node's properties into this one; later (incoming)
    /// values win on key conflict. Used by `write_node`'s MERGE semantics.
    pub fn merge_from(&mut self, other: &Node) {
        for (k, v) in &other.properties {
            self.properties.insert(k.clone(), v.clone());
        }
        for (k, v) in &other.context {
            self.context.insert(k.clone(), v.clone());
        }
        self.name = other.name.clone();
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub relation: EdgeKind,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Edge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, relation: EdgeKind) -> Self {
        Edge {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation,
            properties: Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_round_trips_through_closed_set() {
        for kind in [
            NodeKind::Directory,
            NodeKind::Pipeline,
            NodeKind::Operation,
            NodeKind::Table,
            NodeKind::MaterializedView,
        ] {
            let s = kind.as_str();
            assert_eq!(NodeKind::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            NodeKind::from_str("bogus"),
            Err(ModelError::UnknownKind(_))
        ));
    }

    #[test]
    fn merge_from_overwrites_conflicting_keys() {
        let mut a = Node::new("table:x", NodeKind::Table, "x").with_property("server", "a");
        let b = Node::new("table:x", NodeKind::Table, "x").with_property("server", "b");
        a.merge_from(&b);
        assert_eq!(a.get_property("server").unwrap(), "b");
    }
}
