// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use crate::application::chart_controller::ChartController;
use crate::application::history_service::HistoryService;
use crate::application::streaming_service::LiveStreamingService;
use crate::application::view_service::ViewService;
use crate::domain::view::ViewState;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::firebase_repository::FirebaseRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_app_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(FirebaseRepository::new(
        config.firebase.database_url,
        config.firebase.auth,
        config.firebase.readings_path,
    ));

    // Shared chart and view state
    let charts = Arc::new(RwLock::new(ChartController::new()));
    let view = Arc::new(RwLock::new(ViewState::default()));

    // Create services (application layer)
    let streaming_service =
        LiveStreamingService::new(repository.clone(), charts.clone(), view.clone(), config.live);
    let history_service = HistoryService::new(repository.clone(), charts.clone());
    let view_service = ViewService::new(view.clone());

    let live_feed = streaming_service.start();

    // Create application state
    let state = Arc::new(AppState {
        history_service,
        view_service,
        live_refresh: live_feed.refreshes(),
    });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting sensor-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    live_feed.shutdown().await;
    Ok(())
}
