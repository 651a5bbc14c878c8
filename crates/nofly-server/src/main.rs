//! nofly server - HTTP route planning around forbidden zones

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nofly_server::api;
use nofly_server::config::Config;
use nofly_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("nofly_server=debug".parse()?)
            .add_directive("nofly_core=info".parse()?))
        .init();

    tracing::info!("Starting nofly server...");

    let config = Config::from_env()?;
    let port = config.server_port;
    tracing::info!(
        ellipsoid = %config.default_ellipsoid,
        timeout_ms = config.route_timeout.as_millis() as u64,
        max_vertices = ?config.max_vertices,
        "loaded configuration"
    );
    let state = Arc::new(AppState::new(config));

    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
