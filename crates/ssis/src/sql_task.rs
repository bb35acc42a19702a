//! Execute-SQL task extraction (C4 step 3, Execute-SQL branch).

use crate::xmltree::XmlElement;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlStatementType {
    Select,
    Insert,
    Update,
    Delete,
    Execute,
    Create,
    Drop,
    Unknown,
}

impl SqlStatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlStatementType::Select => "SELECT",
            SqlStatementType::Insert => "INSERT",
            SqlStatementType::Update => "UPDATE",
            SqlStatementType::Delete => "DELETE",
            SqlStatementType::Execute => "EXECUTE",
            SqlStatementType::Create => "CREATE",
            SqlStatementType::Drop => "DROP",
            SqlStatementType::Unknown => "UNKNOWN",
        }
    }

    pub fn classify(sql: &str) -> SqlStatementType {
        let trimmed = sql.trim_start().to_uppercase();
        if trimmed.starts_with("SELECT") {
            SqlStatementType::Select
        } else if trimmed.starts_with("INSERT") {
            SqlStatementType::Insert
        } else if trimmed.starts_with("UPDATE") {
            SqlStatementType::Update
        } else if trimmed.starts_with("DELETE") {
            SqlStatementType::Delete
        } else if trimmed.starts_with("EXEC") {
            SqlStatementType::Execute
        } else if trimmed.starts_with("CREATE") {
            SqlStatementType::Create
        } else if trimmed.starts_with("DROP") {
            SqlStatementType::Drop
        } else {
            SqlStatementType::Unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterMappingEntry {
    pub position: String,
    pub direction: String,
    pub guid: String,
}

fn table_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:FROM|JOIN|UPDATE|INSERT\s+INTO|DELETE\s+FROM)\s+(?:\[?([A-Za-z0-9_]+)\]?\.)?\[?([A-Za-z0-9_]+)\]?")
            .unwrap()
    })
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\?").unwrap())
}

fn parameter_mapping_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^:]+):([^"]+)",\{([0-9A-Fa-f\-]+)\}"#).unwrap())
}

/// `FROM|JOIN|UPDATE|INSERT INTO|DELETE FROM` table references, each as
/// `schema.table` (schema absent when unqualified).
pub fn extract_table_references(sql: &str) -> Vec<String> {
    table_ref_re()
        .captures_iter(sql)
        .map(|caps| match caps.get(1) {
            Some(schema) => format!("{}.{}", schema.as_str(), &caps[2]),
            None => caps[2].to_string(),
        })
        .collect()
}

pub fn count_placeholders(sql: &str) -> usize {
    placeholder_re().find_iter(sql).count()
}

/// Parses the `"Position:Direction",{GUID};…` format of the `ParameterMapping`
/// property.
pub fn parse_parameter_mapping(raw: &str) -> Vec<ParameterMappingEntry> {
    parameter_mapping_re()
        .captures_iter(raw)
        .map(|caps| ParameterMappingEntry {
            position: caps[1].to_string(),
            direction: caps[2].to_string(),
            guid: caps[3].to_string(),
        })
        .collect()
}

/// The `SqlStatementSource` property text on an `Microsoft.ExecuteSQLTask`
/// task's `ObjectData`, plus the sibling `ParameterMapping` property.
pub fn extract_sql_and_mapping(task: &XmlElement) -> (String, Option<String>) {
    let object_data = task.find_descendant("ObjectData");
    let sql_task_data = object_data.and_then(|od| od.find_descendant("SqlTaskData"));
    let sql = sql_task_data
        .and_then(|d| d.attr("SqlStatementSource"))
        .or_else(|| task.property_text("SqlStatementSource"))
        .unwrap_or("")
        .to_string();
    let mapping = sql_task_data
        .and_then(|d| d.attr("ParameterMapping"))
        .or_else(|| task.property_text("ParameterMapping"))
        .map(str::to_string);
    (sql, mapping)
}
