//! Error taxonomy shared by the graph-client contract and its implementations.

use thiserror::Error;

/// Errors a [`crate::graph::GraphClient`] implementation may report.
///
/// Per the graph-client contract, a `MissingEndpoint` on `write_edge` is the
/// in-memory backend's documented strategy; the remote backend instead
/// accepts the write and completes the edge asynchronously (see
/// `etlgraph-remote`).
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("edge {source} -> {target} ({relation}) references a missing endpoint")]
    MissingEndpoint {
        source: String,
        target: String,
        relation: String,
    },

    #[error("graph backend unavailable: {0}")]
    BackendUnavailable(String),
}
