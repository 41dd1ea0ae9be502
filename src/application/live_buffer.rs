// Live feed buffer - bounded, deduplicated display window per metric
use crate::domain::reading::{Metric, Reading, ReadingKey};
use crate::domain::telemetry::Series;

pub const DEFAULT_CAPACITY: usize = 20;

/// Whether the presentation layer should show the "no data" notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSignal {
    NoData,
    DataPresent,
}

/// Keeps one series per metric, bounded to `capacity` distinct labels.
///
/// Labels are unique per series and evicted oldest-first. Every reading
/// pushes exactly one value into every series, even when its label was
/// already present; values beyond `capacity` are dropped oldest-first.
#[derive(Debug, Clone)]
pub struct LiveFeedBuffer {
    capacity: usize,
    series: [Series; 4],
}

impl LiveFeedBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            series: Default::default(),
        }
    }

    /// Bulk preload, input assumed oldest first.
    pub fn initialize<I>(&mut self, preload: I) -> DataSignal
    where
        I: IntoIterator<Item = (ReadingKey, Reading)>,
    {
        let mut loaded = false;
        for (key, reading) in preload {
            let label = key.time_label();
            for metric in Metric::ALL {
                let series = &mut self.series[metric.index()];
                series.labels.push(label.clone());
                series.values.push(reading.value(metric));
            }
            loaded = true;
        }

        if loaded {
            DataSignal::DataPresent
        } else {
            DataSignal::NoData
        }
    }

    pub fn on_reading(&mut self, key: &ReadingKey, reading: &Reading) -> DataSignal {
        let label = key.time_label();

        for metric in Metric::ALL {
            let series = &mut self.series[metric.index()];
            if !series.contains_label(&label) {
                if series.labels.len() >= self.capacity {
                    series.labels.remove(0);
                    if !series.values.is_empty() {
                        series.values.remove(0);
                    }
                }
                series.labels.push(label.clone());
            }
            series.values.push(reading.value(metric));
            while series.values.len() > self.capacity {
                series.values.remove(0);
            }
        }

        DataSignal::DataPresent
    }

    pub fn series(&self, metric: Metric) -> &Series {
        &self.series[metric.index()]
    }

    pub fn snapshot(&self) -> Vec<(Metric, Series)> {
        Metric::ALL
            .iter()
            .map(|m| (*m, self.series(*m).clone()))
            .collect()
    }
}

impl Default for LiveFeedBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
