// Live streaming service - preload, then follow the store's feed into the live charts
use crate::application::chart_controller::ChartController;
use crate::application::live_buffer::{DataSignal, LiveFeedBuffer};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::{ChartSet, ChartSetKind};
use crate::domain::view::ViewState;
use crate::infrastructure::config::LiveSettings;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running live feed. Cancelling it ends the subscription.
pub struct LiveFeedHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    refresh: watch::Receiver<Option<ChartSet>>,
}

impl LiveFeedHandle {
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    /// Receives every live chart refresh
    pub fn refreshes(&self) -> watch::Receiver<Option<ChartSet>> {
        self.refresh.clone()
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the feed task to exit
    pub async fn shutdown(self) {
        self.unsubscribe();
        if let Err(e) = self.task.await {
            tracing::error!("Live feed task failed: {}", e);
        }
    }
}

#[derive(Clone)]
pub struct LiveStreamingService {
    repository: Arc<dyn TelemetryRepository>,
    charts: Arc<RwLock<ChartController>>,
    view: Arc<RwLock<ViewState>>,
    settings: LiveSettings,
}

impl LiveStreamingService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        charts: Arc<RwLock<ChartController>>,
        view: Arc<RwLock<ViewState>>,
        settings: LiveSettings,
    ) -> Self {
        Self {
            repository,
            charts,
            view,
            settings,
        }
    }

    pub fn start(&self) -> LiveFeedHandle {
        let (tx, rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let service = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Live feed cancelled");
                }
                _ = service.run(tx) => {}
            }
        });

        LiveFeedHandle {
            cancel,
            task,
            refresh: rx,
        }
    }

    async fn run(&self, tx: watch::Sender<Option<ChartSet>>) {
        let mut buffer = LiveFeedBuffer::new(self.settings.capacity);
        let preload_count = self.settings.preload.min(self.settings.capacity);

        // 1. Preload the most recent readings
        let preload = match self.repository.last_readings(preload_count).await {
            Ok(readings) => readings,
            Err(e) => {
                tracing::error!("Failed to preload live readings: {}", e);
                self.view.write().await.set_no_data(true);
                return;
            }
        };

        tracing::info!("Preloaded {} live readings", preload.len());
        let signal = buffer.initialize(preload);
        self.apply(&buffer, signal, &tx).await;

        // 2. Follow new readings in delivery order
        let mut subscription = match self.repository.subscribe_new().await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::error!("Failed to subscribe to live readings: {}", e);
                return;
            }
        };

        while let Some(event) = subscription.next().await {
            match event {
                Ok((key, reading)) => {
                    tracing::debug!("Live reading {}", key);
                    let signal = buffer.on_reading(&key, &reading);
                    self.apply(&buffer, signal, &tx).await;
                }
                Err(e) => {
                    tracing::error!("Live feed failed: {}", e);
                    break;
                }
            }
        }

        subscription.unsubscribe();
        tracing::info!("Live feed ended");
    }

    async fn apply(
        &self,
        buffer: &LiveFeedBuffer,
        signal: DataSignal,
        tx: &watch::Sender<Option<ChartSet>>,
    ) {
        self.view
            .write()
            .await
            .set_no_data(signal == DataSignal::NoData);

        let charts = ChartController::charts_from_series(buffer.snapshot(), None);
        let set = self
            .charts
            .write()
            .await
            .update(ChartSetKind::Live, charts)
            .clone();

        // no receivers is fine
        let _ = tx.send(Some(set));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::memory_repository::MemoryRepository;
    use crate::domain::reading::{Metric, Reading};
    use std::time::Duration;

    fn settings() -> LiveSettings {
        LiveSettings {
            capacity: 20,
            preload: 5,
        }
    }

    fn reading(temp: f64) -> Reading {
        Reading {
            temp_dht: Some(temp),
            hum_dht: Some(55.0),
            temp_bmp: Some(temp),
            pres_bmp: Some(1010.0),
        }
    }

    type Shared = (
        LiveStreamingService,
        Arc<RwLock<ChartController>>,
        Arc<RwLock<ViewState>>,
    );

    fn service(repo: Arc<MemoryRepository>) -> Shared {
        let charts = Arc::new(RwLock::new(ChartController::new()));
        let view = Arc::new(RwLock::new(ViewState::default()));
        let service = LiveStreamingService::new(repo, charts.clone(), view.clone(), settings());
        (service, charts, view)
    }

    async fn wait_for_subscriber(repo: &MemoryRepository) {
        for _ in 0..100 {
            if repo.has_subscriber() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("live feed never subscribed");
    }

    #[tokio::test]
    async fn test_preload_then_follow_feed() {
        let repo = Arc::new(MemoryRepository::new());
        for second in 0..8 {
            repo.insert(&format!("2024-01-01-10-00-{:02}", second), reading(second as f64));
        }

        let (service, charts, view) = service(repo.clone());
        let handle = service.start();
        let mut refreshes = handle.refreshes();
        wait_for_subscriber(&repo).await;

        {
            let charts = charts.read().await;
            let temp = charts
                .get(ChartSetKind::Live)
                .and_then(|set| set.chart(Metric::TempDht))
                .unwrap();
            assert_eq!(
                temp.series.labels,
                vec!["10:00:03", "10:00:04", "10:00:05", "10:00:06", "10:00:07"]
            );
        }
        assert!(!view.read().await.no_data_notice_visible);

        refreshes.borrow_and_update();
        assert!(repo.push("2024-01-01-10-00-08", reading(8.0)).await);
        refreshes.changed().await.unwrap();

        let set = refreshes.borrow().clone().unwrap();
        let temp = set.chart(Metric::TempDht).unwrap();
        assert_eq!(temp.series.labels.len(), 6);
        assert_eq!(temp.series.values.last(), Some(&Some(8.0)));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_preload_shows_notice_until_first_reading() {
        let repo = Arc::new(MemoryRepository::new());
        let (service, _charts, view) = service(repo.clone());
        let handle = service.start();
        let mut refreshes = handle.refreshes();
        wait_for_subscriber(&repo).await;

        assert!(view.read().await.no_data_notice_visible);

        refreshes.borrow_and_update();
        repo.push("2024-01-01-10-00-00", reading(1.0)).await;
        refreshes.changed().await.unwrap();
        assert!(!view.read().await.no_data_notice_visible);

        handle.unsubscribe();
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_releases_feed() {
        let repo = Arc::new(MemoryRepository::new());
        let (service, _charts, _view) = service(repo.clone());
        let handle = service.start();
        wait_for_subscriber(&repo).await;

        handle.unsubscribe();
        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(handle.is_finished());
        assert!(!repo.has_subscriber());
    }

    #[tokio::test]
    async fn test_feed_end_stops_task_and_keeps_charts() {
        let repo = Arc::new(MemoryRepository::new());
        repo.insert("2024-01-01-10-00-00", reading(1.0));
        let (service, charts, _view) = service(repo.clone());
        let handle = service.start();
        wait_for_subscriber(&repo).await;

        repo.close_feed();
        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(handle.is_finished());

        let charts = charts.read().await;
        let temp = charts
            .get(ChartSetKind::Live)
            .and_then(|set| set.chart(Metric::TempDht))
            .unwrap();
        assert_eq!(temp.series.labels, vec!["10:00:00"]);
        drop(charts);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_preload_failure_shows_notice() {
        let repo = Arc::new(MemoryRepository::failing());
        let (service, charts, view) = service(repo);
        let handle = service.start();
        for _ in 0..100 {
            if handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(handle.is_finished());
        handle.shutdown().await;

        assert!(view.read().await.no_data_notice_visible);
        assert!(charts.read().await.get(ChartSetKind::Live).is_none());
    }
}
