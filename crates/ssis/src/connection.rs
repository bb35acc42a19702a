//! Connection-manager pre-pass (C4): `.conmgr` files plus `DTS:ConnectionManager`
//! elements embedded directly in a package.

use crate::expr::scan;
use crate::platform::{detect_platform, parse_connection_string};
use crate::xmltree::XmlElement;
use etlgraph_core::{Node, NodeKind, SourceContext};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct ConnectionManager {
    pub name: String,
    pub guid: Option<String>,
    pub creation_name: String,
    pub connection_string: String,
    pub server: Option<String>,
    pub database: Option<String>,
    pub provider: Option<String>,
    pub integrated_security: Option<String>,
    pub application_name: Option<String>,
    pub is_parameterized: bool,
    pub uses_parameters: Vec<String>,
    pub uses_variables: Vec<String>,
    pub platform: &'static str,
}

impl ConnectionManager {
    pub fn id(&self) -> String {
        format!("connection:{}", self.name)
    }

    pub fn to_node(&self, source_file_path: &str) -> Node {
        let context = SourceContext::xml_metadata(
            source_file_path,
            "DTS:ConnectionManager",
            None,
            "ssis",
        );
        Node::new(self.id(), NodeKind::Connection, self.name.clone())
            .with_property("creation_name", json!(self.creation_name))
            .with_property("connection_string", json!(self.connection_string))
            .with_property("server", json!(self.server))
            .with_property("database", json!(self.database))
            .with_property("provider", json!(self.provider))
            .with_property("integrated_security", json!(self.integrated_security))
            .with_property("application_name", json!(self.application_name))
            .with_property("is_parameterized", json!(self.is_parameterized))
            .with_property("uses_parameters", json!(self.uses_parameters))
            .with_property("uses_variables", json!(self.uses_variables))
            .with_property("platform_type", json!(self.platform))
            .with_context(context)
    }
}

/// Parses the single `DTS:ConnectionManager` element found in a `.conmgr`
/// file, or a `DTS:ConnectionManager` embedded directly under a package's
/// `DTS:ConnectionManagers` element.
pub fn parse_connection_manager(elem: &XmlElement) -> ConnectionManager {
    let name = elem
        .attr("DTS:ObjectName")
        .or_else(|| elem.attr("ObjectName"))
        .unwrap_or("UnnamedConnection")
        .to_string();
    let guid = elem.attr("DTS:DTSID").or_else(|| elem.attr("DTSID")).map(str::to_string);
    let creation_name = elem
        .attr("DTS:CreationName")
        .or_else(|| elem.attr("CreationName"))
        .unwrap_or("")
        .to_string();

    let connection_string = elem
        .find_descendant("ObjectData")
        .and_then(|od| od.find_descendant("ConnectionManager"))
        .and_then(|cm| cm.attr("ConnectionString"))
        .or_else(|| elem.attr("DTS:ConnectionString"))
        .unwrap_or("")
        .to_string();

    let parts = parse_connection_string(&connection_string);
    let server = parts.get("Data Source").cloned();
    let database = parts.get("Initial Catalog").cloned();
    let provider = parts.get("Provider").cloned();
    let integrated_security = parts.get("Integrated Security").cloned();
    let application_name = parts.get("Application Name").cloned();

    let refs = scan(&connection_string);
    let is_parameterized = !refs.variables.is_empty() || !refs.parameters.is_empty();
    let platform = detect_platform(provider.as_deref().unwrap_or(&creation_name).to_string().as_str());

    ConnectionManager {
        name,
        guid,
        creation_name,
        connection_string,
        server,
        database,
        provider,
        integrated_security,
        application_name,
        is_parameterized,
        uses_parameters: refs.parameters,
        uses_variables: refs.variables,
        platform,
    }
}

/// A resolved set of connection managers, keyed by both logical name and
/// GUID so downstream lookups (Execute SQL parameter mapping, data-flow
/// component connection refs) can use either.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    pub by_name: HashMap<String, ConnectionManager>,
    pub by_guid: HashMap<String, String>,
}

impl ConnectionRegistry {
    pub fn insert(&mut self, cm: ConnectionManager) {
        if let Some(guid) = &cm.guid {
            self.by_guid.insert(guid.clone(), cm.name.clone());
        }
        self.by_name.insert(cm.name.clone(), cm);
    }

    pub fn resolve(&self, name_or_guid: &str) -> Option<&ConnectionManager> {
        self.by_name
            .get(name_or_guid)
            .or_else(|| self.by_guid.get(name_or_guid).and_then(|n| self.by_name.get(n)))
    }
}

/// Parses every `.conmgr` file under `root`, keyed for later resolution.
pub fn load_conmgr_files(root: &Path) -> (ConnectionRegistry, Vec<Node>) {
    let mut registry = ConnectionRegistry::default();
    let mut nodes = Vec::new();

    let walker = ignore::WalkBuilder::new(root).build();
    for entry in walker.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("conmgr") {
            continue;
        }
        let Ok(xml) = crate::source::read_xml_file(path) else {
            continue;
        };
        let Ok(doc) = crate::xmltree::parse(&xml) else {
            continue;
        };
        let Some(cm_elem) = doc.find_descendant("ConnectionManager") else {
            continue;
        };
        let cm = parse_connection_manager(cm_elem);
        nodes.push(cm.to_node(&path.to_string_lossy()));
        registry.insert(cm);
    }
    (registry, nodes)
}
