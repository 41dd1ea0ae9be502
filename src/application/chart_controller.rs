// Chart controller - owns the live and historical chart sets
use crate::domain::reading::Metric;
use crate::domain::telemetry::{ChartData, ChartSet, ChartSetKind, Series};

/// Explicit create/update/destroy lifecycle for both panels' charts.
#[derive(Debug, Default)]
pub struct ChartController {
    live: Option<ChartSet>,
    history: Option<ChartSet>,
    revision: u64,
}

impl ChartController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build chart data for the four metrics from their series.
    pub fn charts_from_series(
        series: Vec<(Metric, Series)>,
        tooltip_labels: Option<Vec<String>>,
    ) -> Vec<ChartData> {
        series
            .into_iter()
            .map(|(metric, series)| ChartData::new(metric, series, tooltip_labels.clone()))
            .collect()
    }

    /// Create a chart set, tearing down any existing one of the same kind.
    pub fn create(&mut self, kind: ChartSetKind, charts: Vec<ChartData>) -> &ChartSet {
        if self.destroy(kind).is_some() {
            tracing::debug!("Replaced existing {:?} charts", kind);
        }
        let set = ChartSet {
            kind,
            revision: self.next_revision(),
            charts,
        };
        self.slot(kind).insert(set)
    }

    /// Replace the backing data of an existing set; creates it if absent.
    pub fn update(&mut self, kind: ChartSetKind, charts: Vec<ChartData>) -> &ChartSet {
        let revision = self.next_revision();
        let set = self.slot(kind).get_or_insert_with(|| ChartSet {
            kind,
            revision,
            charts: Vec::new(),
        });
        set.charts = charts;
        set.revision = revision;
        set
    }

    pub fn destroy(&mut self, kind: ChartSetKind) -> Option<ChartSet> {
        self.slot(kind).take()
    }

    pub fn get(&self, kind: ChartSetKind) -> Option<&ChartSet> {
        match kind {
            ChartSetKind::Live => self.live.as_ref(),
            ChartSetKind::History => self.history.as_ref(),
        }
    }

    fn slot(&mut self, kind: ChartSetKind) -> &mut Option<ChartSet> {
        match kind {
            ChartSetKind::Live => &mut self.live,
            ChartSetKind::History => &mut self.history,
        }
    }

    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charts(label: &str, value: f64) -> Vec<ChartData> {
        ChartController::charts_from_series(
            Metric::ALL
                .iter()
                .map(|m| (*m, Series::new(vec![label.to_string()], vec![Some(value)])))
                .collect(),
            None,
        )
    }

    #[test]
    fn test_create_replaces_existing_set() {
        let mut controller = ChartController::new();
        let first = controller.create(ChartSetKind::History, charts("a", 1.0)).revision;
        let second = controller.create(ChartSetKind::History, charts("b", 2.0)).revision;
        assert!(second > first);

        let set = controller.get(ChartSetKind::History).unwrap();
        assert_eq!(set.charts.len(), 4);
        assert_eq!(set.chart(Metric::HumDht).unwrap().series.labels, vec!["b"]);
    }

    #[test]
    fn test_update_and_destroy() {
        let mut controller = ChartController::new();
        controller.update(ChartSetKind::Live, charts("10:00:00", 1.0));
        controller.update(ChartSetKind::Live, charts("10:00:01", 2.0));

        let live = controller.get(ChartSetKind::Live).unwrap();
        assert_eq!(live.revision, 2);
        assert_eq!(
            live.chart(Metric::TempDht).unwrap().series.values,
            vec![Some(2.0)]
        );
        assert!(controller.get(ChartSetKind::History).is_none());

        assert!(controller.destroy(ChartSetKind::Live).is_some());
        assert!(controller.get(ChartSetKind::Live).is_none());
        assert!(controller.destroy(ChartSetKind::Live).is_none());
    }
}
