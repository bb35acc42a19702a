//! etlgraph-core — the canonical node/edge data model and the graph-client
//! contract (C1 + C6) shared by every other crate in the workspace.

pub mod error;
pub mod graph;
pub mod model;

pub use error::GraphError;
pub use graph::{GraphClient, InMemoryGraph};
pub use model::{
    ConfidenceLevel, DerivationMethod, Edge, EdgeKind, ModelError, Node, NodeKind, SourceContext,
};
