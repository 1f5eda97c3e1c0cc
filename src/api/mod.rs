//! REST API and WebSocket server for the monitoring hub
//!
//! This module provides the operator-facing HTTP surface plus the realtime
//! stream. Authentication and session handling live in an outer gateway;
//! this server is deployed behind it.
//!
//! ## Endpoints
//!
//! - `GET  /api/v1/health` - Health check
//! - `GET  /api/v1/devices` - List all devices
//! - `GET  /api/v1/devices/snapshot` - Fleet counts by status
//! - `POST /api/v1/devices/:id/maintenance` - Manual override
//! - `POST /api/v1/devices/:id/shutdown` - Manual override
//! - `POST /api/v1/devices/:id/resume` - Return device to automatic monitoring
//! - `GET  /api/v1/alerts` - List alerts
//! - `POST /api/v1/alerts/:id/acknowledge` - Mark an alert read
//! - `POST /api/v1/alerts/:id/resolve` - Resolve an alert
//! - `WS   /api/v1/stream` - Realtime dashboard stream

#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod routes;
#[cfg(feature = "api")]
pub mod state;
#[cfg(feature = "api")]
pub mod websocket;

#[cfg(feature = "api")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "api")]
pub use state::ApiState;

use std::net::SocketAddr;

#[cfg(feature = "api")]
use axum::{Router, routing::get, routing::post};
#[cfg(feature = "api")]
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    pub bind_addr: SocketAddr,

    /// Enable CORS for dashboards served from another origin
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
        }
    }
}

/// Spawn the API server
///
/// Starts an Axum HTTP server in a background task and returns the bound
/// local address.
#[cfg(feature = "api")]
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    info!("starting API server on {}", config.bind_addr);

    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/devices", get(routes::devices::list_devices))
        .route(
            "/api/v1/devices/snapshot",
            get(routes::devices::fleet_snapshot),
        )
        .route(
            "/api/v1/devices/:id/maintenance",
            post(routes::devices::set_maintenance),
        )
        .route(
            "/api/v1/devices/:id/shutdown",
            post(routes::devices::set_shutdown),
        )
        .route("/api/v1/devices/:id/resume", post(routes::devices::resume))
        .route("/api/v1/alerts", get(routes::alerts::list_alerts))
        .route(
            "/api/v1/alerts/:id/acknowledge",
            post(routes::alerts::acknowledge_alert),
        )
        .route(
            "/api/v1/alerts/:id/resolve",
            post(routes::alerts::resolve_alert),
        )
        .route("/api/v1/stream", get(websocket::websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
