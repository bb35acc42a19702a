//! Binary index blob (via `bincode`) plus a JSON metadata sidecar. Load
//! failures return `None` rather than propagating an error, matching the
//! spec's "null index on load failure" semantics.

use crate::hierarchical::HierarchicalIndex;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub project_id: String,
    pub node_count: usize,
    pub name_count: usize,
    pub created_at: DateTime<Utc>,
    pub index_version: u32,
    pub implementation_status: String,
}

pub const INDEX_VERSION: u32 = 1;

pub fn save(index: &HierarchicalIndex, project_id: &str, blob_path: &Path, sidecar_path: &Path) -> std::io::Result<()> {
    let blob = bincode::serialize(index).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(blob_path, blob)?;

    let metadata = IndexMetadata {
        project_id: project_id.to_string(),
        node_count: index.stats.node_count,
        name_count: index.stats.name_count,
        created_at: Utc::now(),
        index_version: INDEX_VERSION,
        implementation_status: "complete".to_string(),
    };
    let json = serde_json::to_vec_pretty(&metadata)?;
    std::fs::write(sidecar_path, json)?;
    Ok(())
}

/// Returns `None` on any I/O or deserialization failure rather than
/// propagating an error to the caller.
pub fn load(blob_path: &Path) -> Option<HierarchicalIndex> {
    let bytes = std::fs::read(blob_path).ok()?;
    bincode::deserialize(&bytes).ok()
}

pub fn load_metadata(sidecar_path: &Path) -> Option<IndexMetadata> {
    let bytes = std::fs::read(sidecar_path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use etlgraph_core::{Node, NodeKind};

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let blob_path = dir.path().join("index.bin");
        let sidecar_path = dir.path().join("index.json");

        let nodes = vec![Node::new("table:T", NodeKind::Table, "T")];
        let index = HierarchicalIndex::build(&nodes);
        save(&index, "proj-1", &blob_path, &sidecar_path).unwrap();

        let loaded = load(&blob_path).expect("index should load");
        assert!(loaded.find_by_id("table:T").is_some());

        let metadata = load_metadata(&sidecar_path).expect("metadata should load");
        assert_eq!(metadata.project_id, "proj-1");
        assert_eq!(metadata.node_count, 1);
    }

    #[test]
    fn load_returns_none_on_missing_file() {
        assert!(load(Path::new("/nonexistent/index.bin")).is_none());
    }
}
