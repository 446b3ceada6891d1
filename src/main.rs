// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use tracing::{info, warn};

use esb_gateway::api::router;
use esb_gateway::auth::TokenCodec;
use esb_gateway::config::GatewayConfig;
use esb_gateway::models::CreateApiClientRequest;
use esb_gateway::state::AppState;
use esb_gateway::store::InMemoryStore;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            std::process::exit(1);
        }
    };

    let mut store = InMemoryStore::new();
    seed_from_env(&mut store);

    let state = AppState::new(store, TokenCodec::new(&config.jwt));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    info!(%addr, "ESB gateway listening (docs at /docs)");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");

    // ConnectInfo supplies the transport peer address the origin gate
    // falls back to when no forwarding headers are present.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("HTTP server failed");
}

/// Seed an initial API client from the environment so a fresh deployment
/// has a way in. Only used when both variables are present.
fn seed_from_env(store: &mut InMemoryStore) {
    let (Ok(username), Ok(password)) = (
        env::var("SEED_CLIENT_USERNAME"),
        env::var("SEED_CLIENT_PASSWORD"),
    ) else {
        return;
    };

    let application_name =
        env::var("SEED_CLIENT_APPLICATION").unwrap_or_else(|_| "bootstrap".to_string());

    match store.create_client(CreateApiClientRequest {
        username: username.clone(),
        password: Some(password),
        application_name,
        whitelisted_ips: None,
        function_ids: None,
    }) {
        Ok(_) => info!(username, "seeded API client"),
        Err(err) => warn!(username, error = %err.message, "failed to seed API client"),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=debug"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if env::var("LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("shutdown signal received");
}
