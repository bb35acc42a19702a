//! Regex-sweep SQL parser (C3). `parse` never panics or propagates an error:
//! any internal failure degrades to an empty [`SqlSemantics`] with the
//! original string preserved, matching the original Python parser's
//! best-effort contract.

use crate::semantics::{ColumnExpression, JoinKind, JoinRelationship, SqlSemantics, TableReference};
use regex::Regex;
use std::sync::OnceLock;

fn keyword_spacing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\s+(FROM|JOIN|WHERE|ON|AS)\s+").unwrap())
}

fn comma_spacing_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*,\s*").unwrap())
}

fn from_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)FROM\s+(?:\[?([^\s\[\].]+)\]?\.)?(?:\[?([^\s\[\].]+)\]?)(?:\s+(?:AS\s+)?([^\s]+))?",
        )
        .unwrap()
    })
}

fn plain_join_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:INNER\s+|LEFT\s+|RIGHT\s+|FULL\s+OUTER\s+|CROSS\s+)?JOIN\s+(?:\[?([^\s\[\].]+)\]?\.)?(?:\[?([^\s\[\].]+)\]?)(?:\s+(?:AS\s+)?([^\s]+))?",
        )
        .unwrap()
    })
}

fn join_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:INNER\s+JOIN|LEFT\s+JOIN|RIGHT\s+JOIN|FULL\s+OUTER\s+JOIN|CROSS\s+JOIN|JOIN|WHERE|ORDER\s+BY|GROUP\s+BY|HAVING)\b",
        )
        .unwrap()
    })
}

fn join_table_condition_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)^(?:\[?([^\s\[\].]+)\]?\.)?(?:\[?([^\s\[\].]+)\]?)(?:\s+(?:AS\s+)?([^\s]+))?\s+ON\s+(.+)$",
        )
        .unwrap()
    })
}

fn select_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)SELECT\s+(.*?)\s+FROM").unwrap())
}

fn column_alias_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)^(.+?)\s+AS\s+(\w+)$").unwrap())
}

fn table_col_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)\.(\w+)$").unwrap())
}

fn where_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)WHERE\s+(.+?)(?:\s+(?:ORDER|GROUP|HAVING)|$)").unwrap())
}

/// Collapses whitespace and ensures single spaces around `FROM|JOIN|WHERE|ON|AS`.
fn normalize_sql(sql: &str) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    let with_commas = comma_spacing_re().replace_all(&collapsed, ", ");
    let with_keywords = keyword_spacing_re().replace_all(&with_commas, " $1 ");
    with_keywords.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn extract_table_references(sql: &str) -> Vec<TableReference> {
    let mut tables = Vec::new();

    if let Some(caps) = from_re().captures(sql) {
        let (schema, name) = split_schema_table(caps.get(1), caps.get(2));
        let alias = caps.get(3).map(|m| m.as_str().to_string());
        tables.push(TableReference { name, alias, schema });
    }

    for caps in plain_join_re().captures_iter(sql) {
        let (schema, name) = split_schema_table(caps.get(1), caps.get(2));
        if name.is_empty() {
            continue;
        }
        let alias = caps.get(3).map(|m| m.as_str().to_string());
        tables.push(TableReference { name, alias, schema });
    }

    tables
}

fn split_schema_table(g1: Option<regex::Match>, g2: Option<regex::Match>) -> (Option<String>, String) {
    match (g1, g2) {
        (Some(schema), Some(name)) => (Some(schema.as_str().to_string()), name.as_str().to_string()),
        (Some(single), None) => (None, single.as_str().to_string()),
        (None, Some(name)) => (None, name.as_str().to_string()),
        (None, None) => (None, String::new()),
    }
}

/// Splits each `JOIN ... ON ...` clause out of `sql` using keyword boundaries,
/// since the original's lookahead-based terminator regex has no direct
/// equivalent in a non-backtracking engine.
fn extract_join_relationships(sql: &str, tables: &[TableReference]) -> Vec<JoinRelationship> {
    let boundaries: Vec<regex::Match> = join_boundary_re().find_iter(sql).collect();
    let left = tables.first().cloned().unwrap_or(TableReference {
        name: "Unknown".to_string(),
        alias: None,
        schema: None,
    });

    let mut joins = Vec::new();
    for (i, m) in boundaries.iter().enumerate() {
        let keyword = m.as_str();
        if !keyword.to_uppercase().contains("JOIN") {
            continue;
        }
        let clause_end = boundaries.get(i + 1).map(|n| n.start()).unwrap_or(sql.len());
        let rest = sql[m.end()..clause_end].trim_start();

        let Some(caps) = join_table_condition_re().captures(rest) else {
            continue;
        };
        let (schema, name) = split_schema_table(caps.get(1), caps.get(2));
        if name.is_empty() {
            continue;
        }
        let alias = caps.get(3).map(|a| a.as_str().to_string());
        let condition = caps.get(4).map(|c| c.as_str().trim().to_string()).unwrap_or_default();

        let right = tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .unwrap_or(TableReference {
                name: name.clone(),
                alias,
                schema,
            });

        joins.push(JoinRelationship {
            kind: JoinKind::from_raw(keyword),
            left: left.clone(),
            right,
            condition: condition.clone(),
            raw_condition: condition,
        });
    }
    joins
}

/// Splits a `SELECT` clause on top-level commas, respecting parenthesis nesting.
fn split_select_columns(select_clause: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    for ch in select_clause.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                columns.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        columns.push(current.trim().to_string());
    }
    columns
}

fn extract_column_expressions(sql: &str, tables: &[TableReference]) -> Vec<ColumnExpression> {
    let Some(caps) = select_clause_re().captures(sql) else {
        return Vec::new();
    };
    let select_clause = caps.get(1).unwrap().as_str().trim();

    let alias_to_table: std::collections::HashMap<&str, &str> = tables
        .iter()
        .filter_map(|t| t.alias.as_deref().map(|a| (a, t.name.as_str())))
        .collect();

    let mut columns = Vec::new();
    for expr in split_select_columns(select_clause) {
        let expr = expr.trim();
        if expr.is_empty() {
            continue;
        }

        let (source_expr, alias) = match column_alias_re().captures(expr) {
            Some(caps) => (
                caps.get(1).unwrap().as_str().trim().to_string(),
                Some(caps.get(2).unwrap().as_str().to_string()),
            ),
            None => (expr.to_string(), None),
        };

        let mut source_table = None;
        let mut source_alias = None;
        let mut column_name = None;

        if let Some(caps) = table_col_re().captures(&source_expr) {
            let a = caps.get(1).unwrap().as_str().to_string();
            column_name = Some(caps.get(2).unwrap().as_str().to_string());
            source_table = alias_to_table.get(a.as_str()).map(|s| s.to_string());
            source_alias = Some(a);
        } else {
            column_name = Some(source_expr.clone());
        }

        columns.push(ColumnExpression {
            expression: expr.to_string(),
            alias,
            source_table,
            source_alias,
            column_name,
        });
    }
    columns
}

fn extract_where_clause(sql: &str) -> Option<String> {
    where_re()
        .captures(sql)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Parses `sql` into [`SqlSemantics`]. Never fails: malformed or empty input
/// yields an empty semantics value carrying the (possibly empty) original
/// query string.
pub fn parse(sql: &str) -> SqlSemantics {
    if sql.trim().is_empty() {
        return SqlSemantics::empty(sql);
    }

    let normalized = normalize_sql(sql);
    let tables = extract_table_references(&normalized);
    let joins = extract_join_relationships(&normalized, &tables);
    let columns = extract_column_expressions(&normalized, &tables);
    let where_clause = extract_where_clause(&normalized);

    tracing::debug!(
        tables = tables.len(),
        joins = joins.len(),
        columns = columns.len(),
        "parsed SQL semantics"
    );

    SqlSemantics {
        original_query: normalized,
        tables,
        joins,
        columns,
        where_clause,
    }
}
