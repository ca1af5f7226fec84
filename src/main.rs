// Main entry point - Dependency injection, stream connection and operator server
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::event_router::EventRouter;
use crate::application::monitor_service::MonitorService;
use crate::application::overlay_service::OverlayService;
use crate::application::telemetry_store::TelemetryStore;
use crate::domain::suppression::{MonotonicClock, SuppressionGate};
use crate::domain::thermal::ColorScale;
use crate::infrastructure::config::{load_monitor_config, websocket_url};
use crate::infrastructure::connection_manager::ConnectionManager;
use crate::infrastructure::http_control_api::HttpControlApi;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    connect, get_overlay, get_state, health_check, intervene, reset, stream_events,
    trigger_scenario,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_monitor_config()?;
    let stream_url = websocket_url(&config.stream.url);
    let scale = ColorScale::new(config.thermal.breakpoints);

    // Control API client (infrastructure layer)
    let control = Arc::new(HttpControlApi::new(
        config.control.api_url.clone(),
        config.control_timeout(),
    )?);

    // Store and services (application layer)
    let store = TelemetryStore::new(
        SuppressionGate::new(Arc::new(MonotonicClock::new())),
        config.suppression(),
    );
    let monitor = Arc::new(MonitorService::new(
        store,
        control,
        scale,
        config.thermal.idle_temperature_c,
    ));
    let overlay = Arc::new(OverlayService::new(
        monitor.clone(),
        scale,
        config.thermal.smoothing_factor,
    ));
    let overlay_task = tokio::spawn(overlay.clone().run(config.frame_interval()));

    // Stream connection; the first attempt runs alongside the server and a failure
    // is only reported through the status
    let connection = Arc::new(ConnectionManager::new(
        EventRouter::new(),
        monitor.clone(),
        config.connect_timeout(),
    ));
    tokio::spawn({
        let connection = connection.clone();
        let stream_url = stream_url.clone();
        async move {
            connection.connect(&stream_url).await;
        }
    });

    let state = Arc::new(AppState {
        monitor,
        overlay,
        connection: connection.clone(),
        stream_url,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/state", get(get_state))
        .route("/overlay", get(get_overlay))
        .route("/events", get(stream_events))
        .route("/scenarios/:name", post(trigger_scenario))
        .route("/reset", post(reset))
        .route("/intervene", post(intervene))
        .route("/connect", post(connect))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting autoclave-monitor on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    overlay_task.abort();
    connection.close().await;
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
