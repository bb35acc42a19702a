//! SQL semantics shapes: tables, joins, column expressions (C3).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    FullOuter,
    Cross,
}

impl JoinKind {
    /// The literal string the original parser stores (`"INNER JOIN"`, etc).
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::FullOuter => "FULL OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }

    /// Parses a raw join keyword phrase (`"LEFT"`, `"JOIN"`, `"FULL OUTER"`, …),
    /// defaulting to `Inner` for a bare `JOIN` or any unrecognized phrase.
    pub fn from_raw(raw: &str) -> JoinKind {
        let upper = raw.trim().to_uppercase();
        let upper = upper.replace("  ", " ");
        match upper.as_str() {
            "JOIN" | "INNER JOIN" => JoinKind::Inner,
            "LEFT JOIN" => JoinKind::Left,
            "RIGHT JOIN" => JoinKind::Right,
            "FULL OUTER JOIN" => JoinKind::FullOuter,
            "CROSS JOIN" => JoinKind::Cross,
            _ => JoinKind::Inner,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableReference {
    pub name: String,
    pub alias: Option<String>,
    pub schema: Option<String>,
}

impl TableReference {
    pub fn full_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRelationship {
    pub kind: JoinKind,
    pub left: TableReference,
    pub right: TableReference,
    pub condition: String,
    pub raw_condition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnExpression {
    pub expression: String,
    pub alias: Option<String>,
    pub source_table: Option<String>,
    pub source_alias: Option<String>,
    pub column_name: Option<String>,
}

impl ColumnExpression {
    pub fn effective_name(&self) -> &str {
        self.alias
            .as_deref()
            .or(self.column_name.as_deref())
            .unwrap_or(&self.expression)
    }
}

/// Complete SQL semantics extracted from a single statement. Parsing never
/// fails: on any internal error, [`crate::parser::parse`] returns an empty
/// semantics value with `original_query` preserved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SqlSemantics {
    pub original_query: String,
    pub tables: Vec<TableReference>,
    pub joins: Vec<JoinRelationship>,
    pub columns: Vec<ColumnExpression>,
    pub where_clause: Option<String>,
}

impl SqlSemantics {
    pub fn empty(original_query: impl Into<String>) -> Self {
        SqlSemantics {
            original_query: original_query.into(),
            ..Default::default()
        }
    }

    pub fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }
}
