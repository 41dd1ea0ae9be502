// In-memory repository used by service tests
use crate::application::telemetry_repository::{
    FeedSubscription, ReadingMap, StoreError, TelemetryRepository,
};
use crate::domain::reading::{Reading, ReadingKey};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type FeedSender = mpsc::Sender<Result<(ReadingKey, Reading), StoreError>>;

#[derive(Default)]
pub struct MemoryRepository {
    readings: Mutex<ReadingMap>,
    feed: Mutex<Option<FeedSender>>,
    fail_queries: bool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, key: &str, reading: Reading) {
        self.readings
            .lock()
            .unwrap()
            .insert(ReadingKey::new(key), reading);
    }

    /// Deliver a reading to the current subscriber, if any
    pub async fn push(&self, key: &str, reading: Reading) -> bool {
        self.insert(key, reading.clone());
        let sender = self.feed.lock().unwrap().clone();
        match sender {
            Some(tx) => tx.send(Ok((ReadingKey::new(key), reading))).await.is_ok(),
            None => false,
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.feed
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| !tx.is_closed())
            .unwrap_or(false)
    }

    /// End the feed as if the upstream connection dropped
    pub fn close_feed(&self) {
        self.feed.lock().unwrap().take();
    }
}

#[async_trait]
impl TelemetryRepository for MemoryRepository {
    async fn last_readings(&self, n: usize) -> Result<ReadingMap, StoreError> {
        if self.fail_queries {
            return Err(StoreError::Transport("unreachable".to_string()));
        }
        let readings = self.readings.lock().unwrap();
        let skip = readings.len().saturating_sub(n);
        Ok(readings
            .iter()
            .skip(skip)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn readings_in_range(&self, start: &str, end: &str) -> Result<ReadingMap, StoreError> {
        if self.fail_queries {
            return Err(StoreError::Transport("unreachable".to_string()));
        }
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .filter(|(k, _)| k.as_str() >= start && k.as_str() <= end)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn subscribe_new(&self) -> Result<FeedSubscription, StoreError> {
        let (tx, rx) = mpsc::channel(16);
        *self.feed.lock().unwrap() = Some(tx);
        Ok(FeedSubscription::new(rx, CancellationToken::new()))
    }
}
