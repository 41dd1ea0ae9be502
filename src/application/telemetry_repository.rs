// Repository trait for reading store access
use crate::domain::reading::{Reading, ReadingKey};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Readings keyed and ordered by their sortable key
pub type ReadingMap = BTreeMap<ReadingKey, Reading>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed store payload: {0}")]
    Payload(String),
}

/// A live "new reading appended" subscription.
///
/// Readings arrive in delivery order. Dropping the subscription or calling
/// [`FeedSubscription::unsubscribe`] stops the producer.
pub struct FeedSubscription {
    rx: mpsc::Receiver<Result<(ReadingKey, Reading), StoreError>>,
    cancel: CancellationToken,
}

impl FeedSubscription {
    pub fn new(
        rx: mpsc::Receiver<Result<(ReadingKey, Reading), StoreError>>,
        cancel: CancellationToken,
    ) -> Self {
        Self { rx, cancel }
    }

    /// Next reading, or `None` once the feed ended or was cancelled
    pub async fn next(&mut self) -> Option<Result<(ReadingKey, Reading), StoreError>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            item = self.rx.recv() => item,
        }
    }

    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// The last `n` readings, oldest first
    async fn last_readings(&self, n: usize) -> Result<ReadingMap, StoreError>;

    /// All readings with `start <= key <= end`
    async fn readings_in_range(&self, start: &str, end: &str) -> Result<ReadingMap, StoreError>;

    /// Subscribe to readings appended from now on
    async fn subscribe_new(&self) -> Result<FeedSubscription, StoreError>;
}
