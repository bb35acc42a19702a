//! etlgraph CLI entry point

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "etlgraph")]
#[command(about = "Knowledge-graph extraction and search over SSIS/Informatica ETL artifacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all but warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Memory,
    Remote,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SearchModeArg {
    Id,
    Name,
    Metadata,
    Content,
    All,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest SSIS/Informatica packages under `root` into the graph
    Ingest {
        /// Repository root to scan for ETL artifacts
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Restrict ingestion to a single package file
        #[arg(long)]
        target_file: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "memory")]
        backend: BackendArg,
    },
    /// Ingest and run the cross-package dependency analyzer
    Analyze {
        #[arg(default_value = ".")]
        root: PathBuf,

        #[arg(long)]
        target_file: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "memory")]
        backend: BackendArg,
    },
    /// Ingest and run a query against the hierarchical search index
    Search {
        #[arg(default_value = ".")]
        root: PathBuf,

        #[arg(long)]
        target_file: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "memory")]
        backend: BackendArg,

        /// Search text
        query: String,

        #[arg(long, value_enum, default_value = "all")]
        mode: SearchModeArg,

        #[arg(long, default_value_t = 10)]
        top_k: usize,
    },
    /// Build analytics-readiness indexes and materialized views (remote backend only)
    Prepare,
    /// Drop every node and edge from the configured graph backend
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("etlgraph={}", log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("etlgraph v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Ingest { root, target_file, backend } => {
            commands::ingest(root, target_file, backend.into()).await
        }
        Commands::Analyze { root, target_file, backend } => {
            commands::analyze(root, target_file, backend.into()).await
        }
        Commands::Search { root, target_file, backend, query, mode, top_k } => {
            commands::search(root, target_file, backend.into(), query, mode.into(), top_k).await
        }
        Commands::Prepare => commands::prepare().await,
        Commands::Clear => commands::clear().await,
    }
}

impl From<BackendArg> for commands::Backend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Memory => commands::Backend::Memory,
            BackendArg::Remote => commands::Backend::Remote,
        }
    }
}

impl From<SearchModeArg> for etlgraph_index::SearchMode {
    fn from(value: SearchModeArg) -> Self {
        match value {
            SearchModeArg::Id => etlgraph_index::SearchMode::Id,
            SearchModeArg::Name => etlgraph_index::SearchMode::Name,
            SearchModeArg::Metadata => etlgraph_index::SearchMode::Metadata,
            SearchModeArg::Content => etlgraph_index::SearchMode::Content,
            SearchModeArg::All => etlgraph_index::SearchMode::All,
        }
    }
}
