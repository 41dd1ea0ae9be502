// HTTP request handlers
use crate::application::history_service::HistoryOutcome;
use crate::domain::date_range::DateRange;
use crate::domain::view::ViewState;
use crate::infrastructure::chart_mapper::{chart_set_to_dto, ChartSetDto};
use crate::infrastructure::json_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

pub const NO_DATA_NOTICE: &str = "no data in this range";

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Serialize)]
struct LiveResponse {
    no_data: bool,
    charts: Option<ChartSetDto>,
}

#[derive(Serialize)]
struct Notice {
    notice: String,
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn notice(text: impl Into<String>) -> Notice {
    Notice {
        notice: text.into(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current live charts and the "no data" flag
pub async fn live_charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let charts = state.live_refresh.borrow().clone().map(chart_set_to_dto);
    let no_data = state.view_service.current().await.no_data_notice_visible;

    respond(StatusCode::OK, &LiveResponse { no_data, charts }, &headers).await
}

/// One `refresh` event per live chart update
pub async fn live_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.live_refresh.clone()).filter_map(|set| {
        let dto = chart_set_to_dto(set?);
        match Event::default().event("refresh").json_data(&dto) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                tracing::error!("Failed to encode live refresh: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keep-alive"),
    )
}

/// Currently rendered historical charts
pub async fn history_charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    match state.history_service.current().await {
        Some(set) => respond(StatusCode::OK, &chart_set_to_dto(set), &headers).await,
        None => respond(StatusCode::NOT_FOUND, &notice("no history loaded"), &headers).await,
    }
}

/// Load a date range into the historical charts
pub async fn load_history(
    Query(query): Query<RangeQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let range = match DateRange::parse(&query.start, &query.end) {
        Ok(range) => range,
        Err(e) => {
            return respond(StatusCode::BAD_REQUEST, &notice(e.to_string()), &headers).await;
        }
    };

    match state.history_service.load_range(&range).await {
        Ok(HistoryOutcome::Rendered(set)) => {
            respond(StatusCode::OK, &chart_set_to_dto(set), &headers).await
        }
        Ok(HistoryOutcome::NoData) => {
            respond(StatusCode::NOT_FOUND, &notice(NO_DATA_NOTICE), &headers).await
        }
        Err(e) => {
            tracing::error!("Error loading history: {:#}", e);
            let body = notice("reading store unavailable");
            respond(StatusCode::BAD_GATEWAY, &body, &headers).await
        }
    }
}

pub async fn current_view(State(state): State<Arc<AppState>>) -> axum::Json<ViewState> {
    axum::Json(state.view_service.current().await)
}

/// Live-panel button
pub async fn show_live(State(state): State<Arc<AppState>>) -> axum::Json<ViewState> {
    axum::Json(state.view_service.show_live().await)
}

/// History-panel button
pub async fn show_history(State(state): State<Arc<AppState>>) -> axum::Json<ViewState> {
    axum::Json(state.view_service.show_history().await)
}
