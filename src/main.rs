// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use agent_resource_server::api::router;
use agent_resource_server::config::{AuthConfig, ServerConfig};
use agent_resource_server::state::AppState;
use agent_resource_server::tools::ToolRegistry;

#[tokio::main]
async fn main() {
    init_tracing();

    let auth_config = match AuthConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load JWT configuration");
            std::process::exit(1);
        }
    };
    if let Err(e) = auth_config.validate() {
        tracing::error!(error = %e, "Invalid JWT configuration");
        std::process::exit(1);
    }
    tracing::info!(
        enabled = auth_config.enabled,
        algorithm = ?auth_config.algorithm,
        enforcement_mode = ?auth_config.enforcement_mode,
        "JWT configuration validated"
    );

    let server = ServerConfig::from_env();
    let state = AppState::new(auth_config, ToolRegistry::with_builtin_tools());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", server.host, server.port)
        .parse()
        .expect("Failed to parse bind address");

    tracing::info!("Agent resource server listening on http://{addr} (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
