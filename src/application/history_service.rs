// History service - Use case for loading a date range into the historical charts
use crate::application::chart_controller::ChartController;
use crate::application::history_loader::{HistoricalRangeLoader, LoadOutcome};
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::date_range::DateRange;
use crate::domain::telemetry::{ChartSet, ChartSetKind};
use anyhow::Context;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    /// Nothing in range; existing historical charts were left untouched
    NoData,
    Rendered(ChartSet),
}

#[derive(Clone)]
pub struct HistoryService {
    loader: Arc<HistoricalRangeLoader>,
    charts: Arc<RwLock<ChartController>>,
    // one load, reshape and redraw at a time
    in_flight: Arc<Mutex<()>>,
}

impl HistoryService {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        charts: Arc<RwLock<ChartController>>,
    ) -> Self {
        Self {
            loader: Arc::new(HistoricalRangeLoader::new(repository)),
            charts,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    /// Loads run one after another, so the displayed set always belongs to
    /// the most recently started request.
    pub async fn load_range(&self, range: &DateRange) -> anyhow::Result<HistoryOutcome> {
        let _guard = self.in_flight.lock().await;
        let keys = range.keys();
        let readings = match self
            .loader
            .load(&keys)
            .await
            .with_context(|| format!("Failed to load history {}..{}", keys.start, keys.end))?
        {
            LoadOutcome::NoData => return Ok(HistoryOutcome::NoData),
            LoadOutcome::Loaded(readings) => readings,
        };

        let history = HistoricalRangeLoader::reshape(&readings);
        let charts =
            ChartController::charts_from_series(history.series, Some(history.tooltip_labels));

        // Old charts are torn down only once the replacement is ready
        let mut controller = self.charts.write().await;
        controller.destroy(ChartSetKind::History);
        let set = controller.create(ChartSetKind::History, charts).clone();

        tracing::info!(
            "Rendered {} historical readings (revision {})",
            readings.len(),
            set.revision
        );
        Ok(HistoryOutcome::Rendered(set))
    }

    pub async fn current(&self) -> Option<ChartSet> {
        self.charts
            .read()
            .await
            .get(ChartSetKind::History)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::memory_repository::MemoryRepository;
    use crate::domain::reading::{Metric, Reading};

    fn reading(temp: f64) -> Reading {
        Reading {
            temp_dht: Some(temp),
            hum_dht: Some(60.0),
            temp_bmp: Some(temp - 1.0),
            pres_bmp: Some(1005.0),
        }
    }

    fn service(repo: Arc<MemoryRepository>) -> HistoryService {
        HistoryService::new(repo, Arc::new(RwLock::new(ChartController::new())))
    }

    #[tokio::test]
    async fn test_load_range_renders_charts() {
        let repo = Arc::new(MemoryRepository::new());
        repo.insert("2023-12-31-23-59-59", reading(0.0));
        repo.insert("2024-01-01-08-00-00", reading(1.0));
        repo.insert("2024-01-01-09-00-00", reading(2.0));
        repo.insert("2024-01-02-00-00-00", reading(3.0));

        let service = service(repo);
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        let outcome = service.load_range(&range).await.unwrap();

        let HistoryOutcome::Rendered(set) = outcome else {
            panic!("expected rendered charts");
        };
        assert_eq!(set.kind, ChartSetKind::History);
        let temp = set.chart(Metric::TempDht).unwrap();
        assert_eq!(temp.series.labels, vec!["2024-01-01", "2024-01-01"]);
        assert_eq!(temp.series.values, vec![Some(1.0), Some(2.0)]);
        assert_eq!(
            temp.tooltip_labels.as_deref(),
            Some(&["2024-01-01 08:00:00".to_string(), "2024-01-01 09:00:00".to_string()][..])
        );
        assert_eq!(service.current().await, Some(set));
    }

    #[tokio::test]
    async fn test_empty_range_keeps_previous_charts() {
        let repo = Arc::new(MemoryRepository::new());
        repo.insert("2024-01-01-08-00-00", reading(1.0));
        let service = service(repo);

        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let HistoryOutcome::Rendered(before) = service.load_range(&range).await.unwrap() else {
            panic!("expected rendered charts");
        };

        let empty = DateRange::parse("2025-06-01", "2025-06-30").unwrap();
        assert_eq!(service.load_range(&empty).await.unwrap(), HistoryOutcome::NoData);
        assert_eq!(service.current().await, Some(before));
    }

    #[tokio::test]
    async fn test_overlapping_loads_leave_latest_revision() {
        let repo = Arc::new(MemoryRepository::new());
        repo.insert("2024-01-01-08-00-00", reading(1.0));
        repo.insert("2024-02-01-08-00-00", reading(2.0));
        let service = service(repo);

        let january = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        let february = DateRange::parse("2024-02-01", "2024-02-29").unwrap();
        let (a, b) = tokio::join!(service.load_range(&january), service.load_range(&february));

        let rendered: Vec<ChartSet> = [a.unwrap(), b.unwrap()]
            .into_iter()
            .map(|outcome| match outcome {
                HistoryOutcome::Rendered(set) => set,
                HistoryOutcome::NoData => panic!("expected rendered charts"),
            })
            .collect();
        assert_ne!(rendered[0].revision, rendered[1].revision);

        let latest = rendered.into_iter().max_by_key(|set| set.revision);
        assert_eq!(service.current().await, latest);
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let service = service(Arc::new(MemoryRepository::failing()));
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert!(service.load_range(&range).await.is_err());
        assert!(service.current().await.is_none());
    }
}
