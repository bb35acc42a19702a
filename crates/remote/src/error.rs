use thiserror::Error;

/// Internal failures translated to [`etlgraph_core::GraphError`] at the
/// `GraphClient` boundary; kept separate so connection diagnostics aren't
/// lost to the narrower closed set the trait exposes.
#[derive(Debug, Error)]
pub enum RemoteGraphError {
    #[error("failed to connect to {uri}: {cause}")]
    ConnectionFailed { uri: String, cause: String },

    #[error("query failed: {0}")]
    QueryFailed(String),
}
