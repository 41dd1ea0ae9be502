// Historical range loader - one-shot range query reshaped into full series
use crate::application::telemetry_repository::{ReadingMap, StoreError, TelemetryRepository};
use crate::domain::date_range::RangeKeys;
use crate::domain::reading::Metric;
use crate::domain::telemetry::Series;
use std::sync::Arc;

/// Four unbounded series sharing one day-label axis, plus tooltips.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalSeries {
    pub series: Vec<(Metric, Series)>,
    pub tooltip_labels: Vec<String>,
}

#[cfg(test)]
impl HistoricalSeries {
    pub fn series(&self, metric: Metric) -> Option<&Series> {
        self.series
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, s)| s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    NoData,
    Loaded(ReadingMap),
}

pub struct HistoricalRangeLoader {
    repository: Arc<dyn TelemetryRepository>,
}

impl HistoricalRangeLoader {
    pub fn new(repository: Arc<dyn TelemetryRepository>) -> Self {
        Self { repository }
    }

    pub async fn load(&self, keys: &RangeKeys) -> Result<LoadOutcome, StoreError> {
        tracing::debug!("Loading history from {} to {}", keys.start, keys.end);
        let readings = self
            .repository
            .readings_in_range(&keys.start, &keys.end)
            .await?;

        if readings.is_empty() {
            tracing::info!("No readings between {} and {}", keys.start, keys.end);
            return Ok(LoadOutcome::NoData);
        }

        tracing::debug!("Loaded {} historical readings", readings.len());
        Ok(LoadOutcome::Loaded(readings))
    }

    pub fn reshape(readings: &ReadingMap) -> HistoricalSeries {
        let day_labels: Vec<String> = readings.keys().map(|k| k.day_label()).collect();
        let tooltip_labels: Vec<String> = readings.keys().map(|k| k.tooltip_label()).collect();

        let series = Metric::ALL
            .iter()
            .map(|metric| {
                let values = readings.values().map(|r| r.value(*metric)).collect();
                (*metric, Series::new(day_labels.clone(), values))
            })
            .collect();

        HistoricalSeries {
            series,
            tooltip_labels,
        }
    }
}
