//! etlgraph-remote — the Cypher-backed `GraphClient` implementation (C6
//! remote backend) and its analytics-readiness extension (C10).

pub mod error;
pub mod readiness;
pub mod remote_graph;

pub use error::RemoteGraphError;
pub use readiness::ReadinessReport;
pub use remote_graph::RemoteGraph;
