//! rglookup - identifier lookup gateway over a research graph
//!
//! Usage:
//!   rglookup serve --seed graph.json             → start the HTTP gateway
//!   rglookup lookup publication doi 10.1/abc     → run one lookup, JSON to stdout
//!   rglookup catalog                             → list supported lookups
//!   rglookup version                             → show version

use clap::{Parser, Subcommand};
use rglookup_core::{BindMode, EntityKind, IdentifierKind, LookupConfig, LookupRequest};
use rglookup_gateway::{start_gateway, AppState};
use rglookup_graph::MemoryGraph;
use rglookup_pipeline::QueryCatalog;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "rglookup",
    about = "Look up publications, datasets, grants and researchers by DOI, PURL or ORCID",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML). Missing file means defaults.
    #[arg(short, long, global = true, default_value = "rglookup.toml")]
    config: PathBuf,

    /// JSON file of nodes to load into the graph
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// loopback or lan
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run a single lookup and print the JSON document
    Lookup {
        entity: String,
        scheme: String,
        identifier: String,
    },
    /// List supported lookups
    Catalog,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, ref bind } => {
            let _guard = init_tracing(cli.log_json, cli.log_dir.as_deref());
            let mut config = load_config(&cli)?;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(bind) = bind {
                config.gateway.bind = BindMode::parse(bind);
            }

            let shutdown = CancellationToken::new();
            let trigger = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Shutdown requested");
                    trigger.cancel();
                }
            });
            start_gateway(config, shutdown).await?;
        }

        Commands::Lookup {
            ref entity,
            ref scheme,
            ref identifier,
        } => {
            let _guard = init_tracing(cli.log_json, cli.log_dir.as_deref());
            let config = load_config(&cli)?;
            let entity = EntityKind::from_label(entity)
                .ok_or_else(|| anyhow::anyhow!("unknown entity kind: {}", entity))?;
            let scheme = IdentifierKind::from_property(scheme)
                .ok_or_else(|| anyhow::anyhow!("unknown identifier kind: {}", scheme))?;

            let graph = Arc::new(MemoryGraph::new());
            if let Some(seed) = &config.store.seed_path {
                graph.load_json(seed)?;
            }
            let state = AppState::new(graph, &config.limits);
            let request = LookupRequest::new(entity, scheme, identifier.clone());
            let mut stdout = tokio::io::stdout();
            state.lookup.lookup(&request, &mut stdout).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Commands::Catalog => {
            for entry in QueryCatalog::standard().entries() {
                println!(
                    "{:<36} {:<12} {}",
                    entry.path,
                    entry.field,
                    if entry.exact { "exact" } else { "pattern" }
                );
            }
        }

        Commands::Version => {
            println!("rglookup v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// File, then `RGLOOKUP_*` environment, then `--seed`.
fn load_config(cli: &Cli) -> anyhow::Result<LookupConfig> {
    let mut config = LookupConfig::load(&cli.config)?;
    config.apply_env()?;
    if let Some(seed) = &cli.seed {
        config.store.seed_path = Some(seed.clone());
    }
    Ok(config)
}

/// Logs go to stderr so `lookup` output on stdout stays clean JSON.
fn init_tracing(json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rglookup=info,tower_http=info".into());

    let (plain, structured) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)), None)
    };

    let (file, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "rglookup.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .with(file)
        .init();
    guard
}
