mod agent;
mod catalog;
mod client;
mod config;
mod controller;
mod error;
mod fallback;
mod gemini;
mod models;
mod narrator;
mod routes;
mod runtime;
mod studio;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    agent::{AgentClient, CampaignPlanner, CatalogFailover, CatalogPlanner},
    config::{BackendMode, RerenderPolicy, ServerConfig, StudioConfig},
    gemini::GeminiClient,
    routes::AppState,
};

#[derive(Debug, Parser)]
#[command(name = "prachar", version, about = "AI creative director: campaign backend and terminal studio")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP backend.
    Serve(ServeArgs),
    /// Run the terminal studio against a backend.
    Studio(StudioArgs),
}

#[derive(Debug, Parser)]
struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long, value_enum)]
    backend: Option<BackendMode>,
    /// Planning agent endpoint; the built-in catalog is used when absent.
    #[arg(long)]
    agent_url: Option<String>,
    /// Answer from the catalog when the agent fails instead of returning 500.
    #[arg(long)]
    agent_failover: bool,
}

#[derive(Debug, Parser)]
struct StudioArgs {
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    grace_ms: Option<u64>,
    #[arg(long, value_enum)]
    rerender: Option<RerenderPolicy>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Studio(args) => {
            let mut cfg = StudioConfig::from_env();
            if let Some(url) = args.api_url {
                cfg.api_url = url;
            }
            if let Some(ms) = args.grace_ms {
                cfg.grace_period = Duration::from_millis(ms);
            }
            if let Some(policy) = args.rerender {
                cfg.rerender = policy;
            }
            studio::run(cfg).await
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut cfg = ServerConfig::from_env();
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(backend) = args.backend {
        cfg.backend = backend;
    }
    if args.agent_url.is_some() {
        cfg.agent_url = args.agent_url;
    }
    cfg.agent_failover |= args.agent_failover;

    tracing::info!("Using API key: {}", cfg.masked_key());
    let planner: Arc<dyn CampaignPlanner> = match &cfg.agent_url {
        Some(url) if cfg.agent_failover => Arc::new(CatalogFailover::new(Arc::new(AgentClient::new(url.clone())))),
        Some(url) => Arc::new(AgentClient::new(url.clone())),
        None => {
            tracing::info!("No agent configured - serving campaigns from the catalog");
            Arc::new(CatalogPlanner)
        }
    };

    let state = AppState {
        mode: cfg.backend,
        user_id: cfg.user_id.clone(),
        text: Arc::new(GeminiClient::new(&cfg)),
        planner,
        history: Arc::default(),
    };
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!(%addr, backend = ?cfg.backend, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
