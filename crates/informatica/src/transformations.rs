//! Per-transformation-type extraction (C5 mapping pass dispatch table).

use etlgraph_core::{Edge, EdgeKind};
use etlgraph_ssis::xmltree::XmlElement;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

fn table_attribute<'a>(elem: &'a XmlElement, name: &str) -> Option<&'a str> {
    elem.children_named("TABLEATTRIBUTE")
        .find(|a| a.attr("NAME") == Some(name))
        .and_then(|a| a.attr("VALUE"))
}

fn lkp_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":LKP\.([A-Za-z0-9_]+)\s*\(").unwrap())
}

fn aggregate_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(SUM|COUNT|AVG|MIN|MAX)\s*\(").unwrap())
}

/// Result of dispatching one `TRANSFORMATION` definition: structured
/// properties to attach to the operation node, plus any edges the
/// transformation's own content implies (e.g. an unconnected `:LKP` call).
pub struct TransformResult {
    pub properties: Map<String, Value>,
    pub edges: Vec<Edge>,
}

/// `transformation_type` is matched case-insensitively against the cached
/// `TRANSFORMATIONTYPE` from the transformation definition; unmatched types
/// fall through to the generic branch.
pub fn extract(
    transformation_type: &str,
    def: &XmlElement,
    instance_id: &str,
) -> TransformResult {
    let mut properties = Map::new();
    let mut edges = Vec::new();
    let lower = transformation_type.to_lowercase();

    match lower.as_str() {
        "source qualifier" => {
            let sql = table_attribute(def, "Sql Query").unwrap_or("").to_string();
            properties.insert("sql_query".into(), json!(sql));
            if !sql.is_empty() {
                let semantics = etlgraph_sql::parse(&sql);
                properties.insert("sql_semantics_tables".into(), json!(semantics.tables));
                for join_edge in etlgraph_sql::join_edges(&semantics) {
                    edges.push(join_edge);
                }
            }
            if let Some(assoc) = table_attribute(def, "ASSOCIATED_SOURCE_INSTANCE") {
                properties.insert("associated_source".into(), json!(assoc));
            }
        }
        "target definition" => {
            // passthrough; the writes_to edge is emitted by the CONNECTOR pass.
        }
        "expression" => {
            let mut expressions = Vec::new();
            for field in def.children_named("TRANSFORMFIELD") {
                if let Some(expr) = field.attr("EXPRESSION") {
                    expressions.push(json!({"port": field.attr("NAME").unwrap_or(""), "expression": expr}));
                    for caps in lkp_call_re().captures_iter(expr) {
                        edges.push(Edge::new(
                            instance_id.to_string(),
                            format!("lookup:{}", &caps[1]),
                            EdgeKind::DependsOn,
                        ));
                    }
                }
            }
            properties.insert("expressions".into(), json!(expressions));
        }
        "filter" => {
            let condition = table_attribute(def, "Filter Condition").unwrap_or("");
            properties.insert("filter_condition".into(), json!(condition));
        }
        "aggregator" => {
            let mut aggregates = Vec::new();
            let mut group_by = Vec::new();
            for field in def.children_named("TRANSFORMFIELD") {
                let name = field.attr("NAME").unwrap_or("");
                if let Some(expr) = field.attr("EXPRESSION") {
                    if let Some(caps) = aggregate_fn_re().captures(expr) {
                        aggregates.push(json!({"port": name, "function": caps[1].to_uppercase(), "expression": expr}));
                        continue;
                    }
                }
                if field.attr("ISGROUPBY").map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(false) {
                    group_by.push(name.to_string());
                }
            }
            properties.insert("aggregates".into(), json!(aggregates));
            properties.insert("group_by".into(), json!(group_by));
        }
        "sorter" => {
            let mut keys = Vec::new();
            for field in def.children_named("TRANSFORMFIELD") {
                if field.attr("ISSORTKEY").map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(false) {
                    keys.push(json!({
                        "port": field.attr("NAME").unwrap_or(""),
                        "order": field.attr("SORTDIRECTION").unwrap_or("ASCENDING"),
                    }));
                }
            }
            properties.insert("sort_keys".into(), json!(keys));
            properties.insert("case_sensitive".into(), json!(table_attribute(def, "Case Sensitive")));
            properties.insert("distinct".into(), json!(table_attribute(def, "Distinct")));
            properties.insert("sort_origin".into(), json!(table_attribute(def, "Sort Origin")));
        }
        "joiner" => {
            let condition = table_attribute(def, "Join Condition").unwrap_or("");
            let join_type = table_attribute(def, "Join Type").unwrap_or("");
            let master_detail_hint = def
                .children_named("TRANSFORMFIELD")
                .find(|f| {
                    f.attr("PORTTYPE")
                        .map(|p| p.contains("MASTER") || p.contains("DETAIL"))
                        .unwrap_or(false)
                })
                .and_then(|f| f.attr("PORTTYPE"))
                .map(str::to_string);
            properties.insert("join_condition".into(), json!(condition));
            properties.insert("join_type".into(), json!(join_type));
            properties.insert("master_detail_hint".into(), json!(master_detail_hint));
        }
        "lookup" | "lookup procedure" => {
            let database = table_attribute(def, "Lookup Source Database").unwrap_or("");
            let condition = table_attribute(def, "Lookup Condition").unwrap_or("");
            properties.insert("lookup_source_database".into(), json!(database));
            properties.insert("lookup_condition".into(), json!(condition));
        }
        "router" => {
            // `GROUP/@TYPE` is "INPUT" for the pass-through input group (not
            // an output at all), "OUTPUT/DEFAULT" for the unconditional
            // default group, and "OUTPUT" for every user-defined group.
            let mut groups = Vec::new();
            let mut order = 0usize;
            for group in def.children_named("GROUP") {
                let group_type = group.attr("TYPE").unwrap_or("");
                if group_type.eq_ignore_ascii_case("INPUT") {
                    continue;
                }
                let name = group.attr("NAME").unwrap_or("");
                let expr = group.attr("EXPRESSION").or_else(|| table_attribute(group, "Group Filter Condition"));
                groups.push(json!({
                    "name": name,
                    "expression": expr,
                    "evaluation_order": order,
                    "is_default": group_type.eq_ignore_ascii_case("OUTPUT/DEFAULT"),
                }));
                order += 1;
            }
            properties.insert("router_groups".into(), json!(groups));
        }
        "union" | "union transformation" => {
            let union_all = table_attribute(def, "Union All").map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(true);
            let fields: Vec<&str> = def.children_named("TRANSFORMFIELD").filter_map(|f| f.attr("NAME")).collect();
            properties.insert("union_all".into(), json!(union_all));
            properties.insert("union_fields".into(), json!(fields));
        }
        "sequence generator" => {
            properties.insert("start_value".into(), json!(table_attribute(def, "Start Value")));
            properties.insert("increment_by".into(), json!(table_attribute(def, "Increment By")));
            properties.insert("end_value".into(), json!(table_attribute(def, "End Value")));
            properties.insert("cycle".into(), json!(table_attribute(def, "Cycle")));
        }
        "update strategy" => {
            properties.insert(
                "update_strategy_expression".into(),
                json!(table_attribute(def, "Update Strategy Expression")),
            );
            properties.insert(
                "forward_rejected_rows".into(),
                json!(table_attribute(def, "Forward Rejected Rows")),
            );
            properties.insert(
                "treat_source_rows_as".into(),
                json!(table_attribute(def, "Treat Source Rows As")),
            );
        }
        "normalizer" => {
            let columns: Vec<Value> = def
                .children_named("TRANSFORMFIELD")
                .map(|f| {
                    json!({
                        "name": f.attr("NAME").unwrap_or(""),
                        "occurs": f.attr("OCCURS"),
                        "reset_level": f.attr("RESETLEVEL"),
                    })
                })
                .collect();
            properties.insert("normalizable_columns".into(), json!(columns));
        }
        "rank" => {
            let rank_field = def
                .children_named("TRANSFORMFIELD")
                .find(|f| f.attr("ISRANKPORT").map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(false))
                .and_then(|f| f.attr("NAME"));
            let group_by: Vec<&str> = def
                .children_named("TRANSFORMFIELD")
                .filter(|f| f.attr("ISGROUPBY").map(|v| v.eq_ignore_ascii_case("yes")).unwrap_or(false))
                .filter_map(|f| f.attr("NAME"))
                .collect();
            properties.insert("rank_field".into(), json!(rank_field));
            properties.insert("rank_type".into(), json!(table_attribute(def, "Top/Bottom")));
            properties.insert("group_by".into(), json!(group_by));
        }
        _ => {
            properties.insert("transformation_type".into(), json!(transformation_type));
            properties.insert("description".into(), json!(def.attr("DESCRIPTION")));
            properties.insert("reusable".into(), json!(def.attr("REUSABLE").map(|v| v.eq_ignore_ascii_case("yes"))));
        }
    }

    TransformResult { properties, edges }
}
