// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    current_view, health_check, history_charts, live_charts, live_stream, load_history,
    show_history, show_live,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/live", get(live_charts))
        .route("/live/stream", get(live_stream))
        .route("/history", get(history_charts).post(load_history))
        .route("/view", get(current_view))
        .route("/view/live", post(show_live))
        .route("/view/history", post(show_history))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
