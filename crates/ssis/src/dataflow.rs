//! Data-flow component classification and rule extraction (C4 step 3,
//! Data-flow task branch).

use crate::connection::{ConnectionManager, ConnectionRegistry};
use crate::sql_task::extract_table_references;
use crate::xmltree::XmlElement;
use etlgraph_core::{Edge, EdgeKind};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentClassification {
    DerivedColumn,
    ConditionalSplit,
    Lookup,
    OleDbCommand,
    OleDbSourceOrDestination,
    Generic,
}

impl ComponentClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentClassification::DerivedColumn => "derived_column",
            ComponentClassification::ConditionalSplit => "conditional_split",
            ComponentClassification::Lookup => "lookup",
            ComponentClassification::OleDbCommand => "ole_db_command",
            ComponentClassification::OleDbSourceOrDestination => "ole_db_source_or_destination",
            ComponentClassification::Generic => "generic",
        }
    }
}

pub fn classify(component_class_id: &str) -> ComponentClassification {
    let lower = component_class_id.to_lowercase();
    if lower.contains("derivedcolumn") {
        ComponentClassification::DerivedColumn
    } else if lower.contains("conditionalsplit") {
        ComponentClassification::ConditionalSplit
    } else if lower.contains("lookup") {
        ComponentClassification::Lookup
    } else if lower.contains("oledbcommand") {
        ComponentClassification::OleDbCommand
    } else if lower.contains("oledbsource") || lower.contains("oledbdestination") {
        ComponentClassification::OleDbSourceOrDestination
    } else {
        ComponentClassification::Generic
    }
}

/// Per-branch extraction, written into the structured property blocks the
/// rest of the system keys on (`derived_column_expressions`,
/// `conditional_split`, `lookups`, `sql_transformation`), plus whatever
/// `reads_from`/`writes_to`/`uses_connection` edges the branch can resolve
/// against the package's connection managers. `comp_id` is the id these
/// edges originate from; `class_id` is the raw `componentClassID`,
/// consulted where `classification` alone doesn't carry enough detail
/// (source vs. destination).
pub fn extract_rules(
    component: &XmlElement,
    classification: ComponentClassification,
    class_id: &str,
    comp_id: &str,
    connections: &ConnectionRegistry,
) -> (Map<String, Value>, Vec<Edge>) {
    let mut props = Map::new();
    let mut edges = Vec::new();

    match classification {
        ComponentClassification::DerivedColumn => {
            let expressions: Vec<Value> = output_columns(component)
                .into_iter()
                .filter_map(|col| {
                    let expr = col.property_text("Expression")?;
                    Some(json!({"name": col.attr("name").unwrap_or(""), "expression": expr}))
                })
                .collect();
            props.insert("derived_column_expressions".to_string(), json!(expressions));
        }
        ComponentClassification::ConditionalSplit => {
            let mut branches: Vec<Value> = Vec::new();
            for (order, output) in find_outputs(component).into_iter().enumerate() {
                if let Some(expr) = output.property_text("FriendlyExpression").or_else(|| output.property_text("Expression")) {
                    branches.push(json!({
                        "name": output.attr("name").unwrap_or(""),
                        "expression": expr,
                        "evaluation_order": order,
                    }));
                }
            }
            props.insert("conditional_split".to_string(), json!(branches));
        }
        ComponentClassification::Lookup => {
            let join_conditions: Vec<Value> = input_columns(component)
                .into_iter()
                .map(|col| {
                    let reference_column = col.property_text("JoinToReferenceColumn").map(str::to_string);
                    let condition_type = if reference_column.is_some() { "equi_join" } else { "pass_through" };
                    json!({
                        "name": col.attr("name").unwrap_or(""),
                        "reference_column": reference_column,
                        "type": condition_type,
                    })
                })
                .collect();

            let output_cols: Vec<Value> = output_columns(component)
                .into_iter()
                .map(|col| json!(col.attr("name").unwrap_or("")))
                .collect();

            let sql_command = component.property_text("SqlCommand").unwrap_or("").to_string();
            let sql_command_param = component.property_text("SqlCommandParam").unwrap_or("").to_string();
            let parameter_map = component.property_text("ParameterMap").unwrap_or("").to_string();
            let no_match_behavior = component.property_text("NoMatchBehavior").unwrap_or("0").to_string();
            let (reference_schema, reference_table) = split_schema_table(component.property_text("OpenRowset"));

            props.insert(
                "lookups".to_string(),
                json!({
                    "join_conditions": join_conditions,
                    "reference_sql": sql_command,
                    "sql_command_param": sql_command_param,
                    "parameter_map": parameter_map,
                    "no_match_behavior": no_match_behavior,
                    "output_columns": output_cols,
                    "reference_schema": reference_schema,
                    "reference_table": reference_table,
                }),
            );

            if let Some(conn) = component_connection(component, connections) {
                edges.push(Edge::new(comp_id.to_string(), conn.id(), EdgeKind::UsesConnection));
            }
            if !sql_command.is_empty() {
                for table in extract_table_references(&sql_command) {
                    edges.push(Edge::new(comp_id.to_string(), format!("table:{table}"), EdgeKind::ReadsFrom));
                }
            } else if let Some(table) = &reference_table {
                let qualified = match &reference_schema {
                    Some(schema) => format!("{schema}.{table}"),
                    None => table.clone(),
                };
                edges.push(Edge::new(comp_id.to_string(), format!("table:{qualified}"), EdgeKind::ReadsFrom));
            }
        }
        ComponentClassification::OleDbCommand => {
            let sql = component.property_text("SqlCommand").unwrap_or("").to_string();
            props.insert("sql_transformation".to_string(), json!({"sql_command": sql}));

            if let Some(conn) = component_connection(component, connections) {
                edges.push(Edge::new(comp_id.to_string(), conn.id(), EdgeKind::UsesConnection));
            }
            for table in extract_table_references(&sql) {
                edges.push(Edge::new(comp_id.to_string(), format!("table:{table}"), EdgeKind::WritesTo));
            }
        }
        ComponentClassification::OleDbSourceOrDestination => {
            let sql = component.property_text("SqlCommand").unwrap_or("").to_string();
            if !sql.is_empty() {
                props.insert("sql_transformation".to_string(), json!({"sql_command": sql}));
            }

            let (schema, table) = split_schema_table(component.property_text("OpenRowset"));
            if let Some(table) = &table {
                let qualified = match &schema {
                    Some(schema) => format!("{schema}.{table}"),
                    None => table.clone(),
                };
                props.insert("source_table".to_string(), json!(qualified));
            }

            if let Some(conn) = component_connection(component, connections) {
                edges.push(Edge::new(comp_id.to_string(), conn.id(), EdgeKind::UsesConnection));
            }

            let relation = if class_id.to_lowercase().contains("destination") {
                EdgeKind::WritesTo
            } else {
                EdgeKind::ReadsFrom
            };
            if !sql.is_empty() {
                for ref_table in extract_table_references(&sql) {
                    edges.push(Edge::new(comp_id.to_string(), format!("table:{ref_table}"), relation));
                }
            } else if let Some(table) = &table {
                let qualified = match &schema {
                    Some(schema) => format!("{schema}.{table}"),
                    None => table.clone(),
                };
                edges.push(Edge::new(comp_id.to_string(), format!("table:{qualified}"), relation));
            }
        }
        ComponentClassification::Generic => {}
    }

    props.insert("column_mappings".to_string(), json!(column_mappings(component)));
    props.insert("error_handling".to_string(), json!(error_handling(component)));
    (props, edges)
}

/// The connection manager a data-flow component reads/writes through, found
/// via its `connections/connection` child (`connectionManagerRefId`,
/// falling back to the raw `connectionManagerID` GUID).
fn component_connection<'a>(component: &XmlElement, connections: &'a ConnectionRegistry) -> Option<&'a ConnectionManager> {
    let conn_elem = component.find_descendant("connections")?.child_named("connection")?;
    let reference = conn_elem.attr("connectionManagerRefId").or_else(|| conn_elem.attr("connectionManagerID"))?;
    let name = reference
        .rsplit_once('[')
        .map(|(_, rest)| rest.trim_end_matches(']'))
        .unwrap_or(reference);
    connections.resolve(name)
}

/// `OpenRowset`-style `[schema].[table]` (or unqualified `[table]`) into its
/// parts, brackets stripped.
fn split_schema_table(raw: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(raw) = raw else { return (None, None) };
    let cleaned = raw.replace(['[', ']'], "");
    match cleaned.split_once('.') {
        Some((schema, table)) => (Some(schema.to_string()), Some(table.to_string())),
        None => (None, Some(cleaned)),
    }
}

fn find_outputs(component: &XmlElement) -> Vec<&XmlElement> {
    let mut outputs = Vec::new();
    if let Some(collection) = component.find_descendant("outputs") {
        outputs.extend(collection.children_named("output"));
    }
    outputs
}

fn output_columns<'a>(component: &'a XmlElement) -> Vec<&'a XmlElement> {
    let mut cols = Vec::new();
    for output in find_outputs(component) {
        if let Some(output_columns) = output.child_named("outputColumns") {
            cols.extend(output_columns.children_named("outputColumn"));
        }
    }
    cols
}

fn input_columns<'a>(component: &'a XmlElement) -> Vec<&'a XmlElement> {
    let mut cols = Vec::new();
    if let Some(inputs) = component.find_descendant("inputs") {
        for input in inputs.children_named("input") {
            if let Some(input_columns) = input.child_named("inputColumns") {
                cols.extend(input_columns.children_named("inputColumn"));
            }
        }
    }
    cols
}

/// Column lineage: input columns (`lineageId`) mapped against output
/// columns' `OutputColumnLineageID`; a present `Expression` marks a
/// `derived_column` mapping, otherwise `pass_through`.
fn column_mappings(component: &XmlElement) -> Vec<Value> {
    let inputs = input_columns(component);
    let outputs = output_columns(component);

    outputs
        .into_iter()
        .map(|out| {
            let lineage_source = out.attr("lineageId").or_else(|| out.attr("OutputColumnLineageID"));
            let matched_input = lineage_source.and_then(|lid| {
                inputs
                    .iter()
                    .find(|inp| inp.attr("lineageId") == Some(lid))
                    .map(|inp| inp.attr("name").unwrap_or("").to_string())
            });
            let expression = out.property_text("Expression");
            json!({
                "output_column": out.attr("name").unwrap_or(""),
                "source_column": matched_input,
                "kind": if expression.is_some() { "derived_column" } else { "pass_through" },
                "expression": expression,
            })
        })
        .collect()
}

fn error_handling(component: &XmlElement) -> Value {
    json!({
        "is_error_out": component.attr("isErrorOut").map(|v| v == "true").unwrap_or(false),
        "error_row_disposition": component.attr("errorRowDisposition"),
        "truncation_row_disposition": component.attr("truncationRowDisposition"),
    })
}
