// Application state for HTTP handlers
use crate::application::history_service::HistoryService;
use crate::application::view_service::ViewService;
use crate::domain::telemetry::ChartSet;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub history_service: HistoryService,
    pub view_service: ViewService,
    pub live_refresh: watch::Receiver<Option<ChartSet>>,
}
