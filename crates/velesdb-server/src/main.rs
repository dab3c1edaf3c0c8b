//! VelesDB-lite server process: parses CLI/env configuration, opens the
//! collection manager (which triggers `load_all`), serves the JSON API,
//! and saves every collection on a clean shutdown signal.
//!
//! Grounded on the teacher's `main.rs` (`clap::Parser` args with `env`
//! fallback, `tracing_subscriber::registry()` setup, `axum::serve` over a
//! `tokio::net::TcpListener`), extended with the graceful-shutdown hook
//! spec.md §4.6 requires that the teacher's own `main.rs` does not install.

use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use velesdb_core::{CliOverrides, CollectionManager, ServiceConfig, SimdTier};
use velesdb_server::{build_router, AppState};

/// VelesDB-lite: a multi-tenant, persistent, in-memory ANN vector search service.
#[derive(Parser, Debug)]
#[command(name = "velesdb-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// gRPC port; accepted for compatibility, not currently served.
    #[arg(long, env = "VECTOR_PORT")]
    port: Option<u16>,

    /// HTTP port the JSON API listens on.
    #[arg(long = "http-port", env = "VECTOR_HTTP_PORT")]
    http_port: Option<u16>,

    /// Directory collections persist their config and binary files to.
    #[arg(long = "data", env = "VECTOR_DATA_DIR")]
    data: Option<String>,
}

impl Args {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            port: self.port,
            http_port: self.http_port,
            data_dir: self.data,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match ServiceConfig::load(args.into_overrides()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        data_dir = %config.data_dir,
        http_port = config.http_port,
        simd_tier = SimdTier::detect().as_str(),
        "starting velesdb-server"
    );

    let manager = match CollectionManager::open(&config.data_dir) {
        Ok(manager) => manager,
        Err(err) => {
            tracing::error!(error = %err, "failed to open collection manager");
            std::process::exit(1);
        }
    };
    let state = Arc::new(AppState { manager });
    let app = build_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, addr, "failed to bind HTTP listener");
            std::process::exit(1);
        }
    };

    tracing::info!(addr, "velesdb-server listening");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server loop exited with an error");
        std::process::exit(1);
    }

    let saved = state.manager.save_all();
    tracing::info!(saved, "saved collections on shutdown");
}

/// Resolves once either `Ctrl-C` or, on unix, `SIGTERM` is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
