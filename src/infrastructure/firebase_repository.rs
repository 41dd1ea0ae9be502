// Firebase Realtime Database repository implementation (REST + streaming)
use crate::application::telemetry_repository::{
    FeedSubscription, ReadingMap, StoreError, TelemetryRepository,
};
use crate::domain::reading::{Reading, ReadingKey};
use crate::infrastructure::event_stream::{decode_events, ServerEvent};
use async_trait::async_trait;
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const FEED_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone)]
pub struct FirebaseRepository {
    client: reqwest::Client,
    database_url: String,
    auth: Option<String>,
    readings_path: String,
}

/// Payload of `put` / `patch` stream events
#[derive(Debug, Deserialize)]
struct StreamPayload {
    path: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// What a single stream event means for the feed
#[derive(Debug, PartialEq)]
enum FeedEvent {
    Readings(Vec<(ReadingKey, Reading)>),
    Ignore,
    Closed(String),
}

impl FirebaseRepository {
    pub fn new(database_url: String, auth: Option<String>, readings_path: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            database_url: database_url.trim_end_matches('/').to_string(),
            auth: auth.filter(|a| !a.is_empty()),
            readings_path: readings_path.trim_matches('/').to_string(),
        }
    }

    fn build_url(&self, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}.json", self.database_url, self.readings_path);
        let mut params: Vec<(&str, String)> = params.to_vec();
        if let Some(auth) = &self.auth {
            params.push(("auth", auth.clone()));
        }

        for (i, (name, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    fn key_order() -> (&'static str, String) {
        ("orderBy", quoted("$key"))
    }

    async fn execute_query(&self, url: &str) -> Result<ReadingMap, StoreError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let data = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::Payload(e.to_string()))?;

        parse_reading_map(data)
    }
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

/// A REST snapshot is `null` or an object of key -> reading
fn parse_reading_map(data: serde_json::Value) -> Result<ReadingMap, StoreError> {
    match data {
        serde_json::Value::Null => Ok(ReadingMap::new()),
        serde_json::Value::Object(children) => Ok(children
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let reading = parse_reading(&key, value);
                (ReadingKey::new(key), reading)
            })
            .collect()),
        other => Err(StoreError::Payload(format!(
            "expected an object of readings, got {}",
            other
        ))),
    }
}

fn parse_reading(key: &str, value: serde_json::Value) -> Reading {
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!("Reading {} is not a record ({}), treating fields as missing", key, e);
        Reading::default()
    })
}

fn interpret_event(event: &ServerEvent) -> FeedEvent {
    match event.event.as_str() {
        "put" | "patch" => {
            let payload: StreamPayload = match serde_json::from_str(&event.data) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!("Malformed {} event: {}", event.event, e);
                    return FeedEvent::Ignore;
                }
            };

            let path = payload.path.trim_matches('/');
            if path.is_empty() {
                return match parse_reading_map(payload.data) {
                    Ok(readings) => FeedEvent::Readings(readings.into_iter().collect()),
                    Err(e) => {
                        tracing::warn!("Ignoring root {} event: {}", event.event, e);
                        FeedEvent::Ignore
                    }
                };
            }

            if path.contains('/') || payload.data.is_null() {
                // field-level update or a child leaving the window
                tracing::debug!("Ignoring {} at /{}", event.event, path);
                return FeedEvent::Ignore;
            }

            let reading = parse_reading(path, payload.data);
            FeedEvent::Readings(vec![(ReadingKey::new(path), reading)])
        }
        "keep-alive" => FeedEvent::Ignore,
        "cancel" => FeedEvent::Closed(format!("stream cancelled by server: {}", event.data)),
        "auth_revoked" => FeedEvent::Closed("stream credential revoked".to_string()),
        other => {
            tracing::debug!("Ignoring stream event {}", other);
            FeedEvent::Ignore
        }
    }
}

/// Forward stream events as readings until the server closes the feed,
/// the subscriber goes away or `cancel` fires
async fn forward_feed<S, B, E>(
    stream: S,
    tx: mpsc::Sender<Result<(ReadingKey, Reading), StoreError>>,
    cancel: CancellationToken,
) where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let events = decode_events(stream);
    futures::pin_mut!(events);

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = events.next() => next,
        };

        let event = match next {
            Some(Ok(event)) => event,
            Some(Err(e)) => {
                let _ = tx.send(Err(StoreError::Transport(e.to_string()))).await;
                break;
            }
            None => {
                tracing::info!("Reading stream closed by server");
                break;
            }
        };

        match interpret_event(&event) {
            FeedEvent::Readings(readings) => {
                for reading in readings {
                    if tx.send(Ok(reading)).await.is_err() {
                        return;
                    }
                }
            }
            FeedEvent::Ignore => {}
            FeedEvent::Closed(reason) => {
                let _ = tx.send(Err(StoreError::Transport(reason))).await;
                break;
            }
        }
    }
}

#[async_trait]
impl TelemetryRepository for FirebaseRepository {
    async fn last_readings(&self, n: usize) -> Result<ReadingMap, StoreError> {
        if n == 0 {
            return Ok(ReadingMap::new());
        }
        let url = self.build_url(&[Self::key_order(), ("limitToLast", n.to_string())]);
        self.execute_query(&url).await
    }

    async fn readings_in_range(&self, start: &str, end: &str) -> Result<ReadingMap, StoreError> {
        let url = self.build_url(&[
            Self::key_order(),
            ("startAt", quoted(start)),
            ("endAt", quoted(end)),
        ]);
        tracing::debug!("Range query {}..{}", start, end);
        self.execute_query(&url).await
    }

    async fn subscribe_new(&self) -> Result<FeedSubscription, StoreError> {
        let url = self.build_url(&[Self::key_order(), ("limitToLast", "1".to_string())]);
        let response = self
            .client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let (tx, rx) = mpsc::channel(FEED_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(forward_feed(response.bytes_stream(), tx, token));

        Ok(FeedSubscription::new(rx, cancel))
    }
}
