//! Connection-string decomposition and platform detection (C4 step 6).

use std::collections::HashMap;

/// Splits a `Key=Value;Key2=Value2` OLE DB / ODBC connection string.
pub fn parse_connection_string(raw: &str) -> HashMap<String, String> {
    let mut parts = HashMap::new();
    for segment in raw.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some((key, value)) = segment.split_once('=') {
            parts.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    parts
}

/// `sqloledb|sqlncli|msoledbsql → sql_server`; `postgresql|npgsql →
/// postgresql`; `mysql → mysql`; `oracle|oraoledb → oracle`; default
/// `sql_server`.
pub fn detect_platform(provider_or_connection_string: &str) -> &'static str {
    let lower = provider_or_connection_string.to_lowercase();
    if lower.contains("sqloledb") || lower.contains("sqlncli") || lower.contains("msoledbsql") {
        "sql_server"
    } else if lower.contains("postgresql") || lower.contains("npgsql") {
        "postgresql"
    } else if lower.contains("mysql") {
        "mysql"
    } else if lower.contains("oracle") || lower.contains("oraoledb") {
        "oracle"
    } else {
        "sql_server"
    }
}
