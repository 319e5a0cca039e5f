//! HTTP server entry point.
//!
//! Validates the environment, builds the Anthropic agent, and serves
//! `/health` and `/chat` on `PORT` (default 3000) until SIGINT or SIGTERM.

mod config;
mod dto;
mod error;
mod handlers;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use relay_agent::{AgentClient, AnthropicAgent};
use relay_core::AgentOptions;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub agent: Arc<dyn AgentClient>,
    pub options: AgentOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let mut agent = AnthropicAgent::new(config.api_key.clone(), config.cwd.clone());
    if let Some(base_url) = &config.api_base {
        info!("Using Messages API at {}", base_url);
        agent = agent.with_base_url(base_url.clone());
    }

    info!(
        "Agent: model={}, permission_mode={}, max_turns={}, cwd={}",
        config.options.model,
        config.options.permission_mode,
        config.options.max_turns,
        config.cwd.display()
    );

    let state = Arc::new(ServerState {
        agent: Arc::new(agent),
        options: config.options,
    });
    let app = routes::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running on port {}", config.port);
    info!("Endpoints:");
    info!("  GET /health - Health check");
    info!("  GET /chat?prompt=你好 - Chat with AI");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Warnings and errors go to stderr, everything else to stdout.
fn init_tracing() {
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();
}

/// Resolves on SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
