// Chart-ready telemetry domain models
use super::reading::Metric;

/// Ordered labels and values backing one chart line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(labels: Vec<String>, values: Vec<Option<f64>>) -> Self {
        Self { labels, values }
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub metric: Metric,
    pub series: Series,
    /// Full date+time per point, historical charts only
    pub tooltip_labels: Option<Vec<String>>,
}

impl ChartData {
    pub fn new(metric: Metric, series: Series, tooltip_labels: Option<Vec<String>>) -> Self {
        Self {
            metric,
            series,
            tooltip_labels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSetKind {
    Live,
    History,
}

/// The four charts of one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub kind: ChartSetKind,
    pub revision: u64,
    pub charts: Vec<ChartData>,
}

#[cfg(test)]
impl ChartSet {
    pub fn chart(&self, metric: Metric) -> Option<&ChartData> {
        self.charts.iter().find(|c| c.metric == metric)
    }
}
