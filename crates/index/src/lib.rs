//! etlgraph-index — the four-level hierarchical entity index (C9) built over
//! a completed graph, plus its domain-aware ETL extension.

pub mod bm25;
pub mod domain;
pub mod error;
pub mod hierarchical;
pub mod persistence;
pub mod tokenize;

pub use domain::{EtlHierarchicalIndex, MigrationFocus};
pub use error::IndexError;
pub use hierarchical::{HierarchicalIndex, SearchHit, SearchMode};
