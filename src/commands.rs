//! CLI command implementations

use etlgraph_core::{GraphClient, InMemoryGraph};
use etlgraph_index::{EtlHierarchicalIndex, SearchMode};
use etlgraph_orchestrator::{GraphBackend, GraphConfig};
use etlgraph_remote::RemoteGraph;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug)]
pub enum Backend {
    Memory,
    Remote,
}

/// Resolves a `--backend` choice into a live [`GraphClient`]. `Memory` always
/// constructs a fresh, process-local graph; `Remote` pulls connection details
/// from the environment the same way [`prepare`]/[`clear`] do, since the CLI
/// itself carries no URI flags.
async fn build_graph(backend: Backend) -> anyhow::Result<Box<dyn GraphClient>> {
    match backend {
        Backend::Memory => Ok(Box::new(InMemoryGraph::new())),
        Backend::Remote => {
            let config = GraphConfig::from_environment()?;
            match config.backend {
                GraphBackend::Remote { uri, user, password, database } => {
                    let graph =
                        RemoteGraph::connect(&uri, user.as_deref(), password.as_deref(), Some(database.as_str())).await?;
                    Ok(Box::new(graph))
                }
                GraphBackend::Memory => {
                    tracing::warn!("--backend remote requested but ETLGRAPH_BACKEND=memory; using an in-memory graph");
                    Ok(Box::new(InMemoryGraph::new()))
                }
            }
        }
    }
}

pub async fn ingest(root: PathBuf, target_file: Option<PathBuf>, backend: Backend) -> anyhow::Result<()> {
    tracing::info!("Ingesting ETL artifacts under {}", root.display());
    let graph = build_graph(backend).await?;

    let report = etlgraph_orchestrator::run_ingest(&root, target_file, graph.as_ref()).await?;
    tracing::info!(
        tools = ?report.tools_run,
        nodes = report.node_count,
        edges = report.edge_count,
        "ingestion complete"
    );
    Ok(())
}

/// Ingests then runs the cross-package analyzer in one process invocation.
/// The analyzer walks an [`InMemoryGraph`] directly rather than the
/// backend-agnostic [`GraphClient`] trait object, so `analyze` always builds
/// its own in-memory graph regardless of the `--backend` flag; `remote` is
/// accepted only so ingestion itself can target a remote store, with the
/// dependency analysis still running against a fresh local copy.
pub async fn analyze(root: PathBuf, target_file: Option<PathBuf>, backend: Backend) -> anyhow::Result<()> {
    if matches!(backend, Backend::Remote) {
        tracing::warn!("cross-package analysis runs against an in-memory graph regardless of --backend");
    }
    tracing::info!("Ingesting and analyzing ETL artifacts under {}", root.display());

    let graph = InMemoryGraph::new();
    etlgraph_orchestrator::run_ingest(&root, target_file, &graph).await?;

    let node_count = graph.get_node_count().await?;
    tracing::info!(node_count, "running cross-package dependency analysis");

    let report = etlgraph_analyzer::analyze(&graph).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn search(
    root: PathBuf,
    target_file: Option<PathBuf>,
    backend: Backend,
    query: String,
    mode: SearchMode,
    top_k: usize,
) -> anyhow::Result<()> {
    tracing::info!("Ingesting and indexing ETL artifacts under {}", root.display());
    let graph = build_graph(backend).await?;

    etlgraph_orchestrator::run_ingest(&root, target_file, graph.as_ref()).await?;

    let nodes = graph.get_all_nodes().await?;
    tracing::info!(node_count = nodes.len(), "building hierarchical index");
    let index = EtlHierarchicalIndex::build(&nodes);

    let hits = index.search(&query, mode, top_k);
    for hit in hits {
        println!("{:.4}\t{}", hit.score, hit.id);
    }
    Ok(())
}

/// Builds analytics-readiness indexes and materialized views. Only
/// meaningful against the remote backend; against an in-memory graph this is
/// a documented no-op since there is nothing left once the process exits.
pub async fn prepare() -> anyhow::Result<()> {
    let config = GraphConfig::from_environment()?;
    match config.backend {
        GraphBackend::Remote { uri, user, password, database } => {
            let graph = RemoteGraph::connect(&uri, user.as_deref(), password.as_deref(), Some(database.as_str())).await?;
            let report = graph.prepare_for_applications().await?;
            tracing::info!(
                indexes = ?report.created_indexes,
                views = ?report.created_views,
                "analytics readiness prepared"
            );
        }
        GraphBackend::Memory => {
            tracing::warn!("ETLGRAPH_BACKEND=memory: analytics readiness only applies to the remote backend, skipping");
        }
    }
    Ok(())
}

/// Drops every node and edge from the configured graph backend. Against the
/// in-memory backend this is a no-op warning: the graph is process-scoped
/// and there is nothing persisted to clear.
pub async fn clear() -> anyhow::Result<()> {
    let config = GraphConfig::from_environment()?;
    match config.backend {
        GraphBackend::Remote { uri, user, password, database } => {
            let graph = RemoteGraph::connect(&uri, user.as_deref(), password.as_deref(), Some(database.as_str())).await?;
            graph.clear_graph().await?;
            tracing::info!("remote graph cleared");
        }
        GraphBackend::Memory => {
            tracing::warn!("ETLGRAPH_BACKEND=memory: nothing to clear, the in-memory graph is process-scoped");
        }
    }
    Ok(())
}
