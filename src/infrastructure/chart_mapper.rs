// Mapper to convert domain models to JSON chart payloads
use crate::domain::telemetry::{ChartData, ChartSet, ChartSetKind};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSetDto {
    pub kind: &'static str,
    pub revision: u64,
    pub charts: Vec<ChartDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartDto {
    pub id: &'static str,
    pub title: &'static str,
    pub unit: &'static str,
    pub color: &'static str,
    pub labels: Vec<String>,
    /// `null` marks a missing reading
    pub values: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip_labels: Option<Vec<String>>,
}

pub fn chart_set_to_dto(set: ChartSet) -> ChartSetDto {
    let kind = match set.kind {
        ChartSetKind::Live => "live",
        ChartSetKind::History => "history",
    };

    ChartSetDto {
        kind,
        revision: set.revision,
        charts: set.charts.into_iter().map(chart_to_dto).collect(),
    }
}

fn chart_to_dto(chart: ChartData) -> ChartDto {
    ChartDto {
        id: chart.metric.field(),
        title: chart.metric.title(),
        unit: chart.metric.unit(),
        color: chart.metric.color(),
        labels: chart.series.labels,
        values: chart.series.values,
        tooltip_labels: chart.tooltip_labels,
    }
}
