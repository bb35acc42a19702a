//! Step 9: the summary handed back to callers after an analysis run.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report {
    pub pipelines_analyzed: usize,
    pub depends_on_edges_written: usize,
    pub shares_resource_edges_written: usize,
    pub execution_order: Vec<String>,
    pub cycle_detected: bool,
    pub high_risk_tables: Vec<String>,
    pub high_risk_resources: Vec<String>,
}
