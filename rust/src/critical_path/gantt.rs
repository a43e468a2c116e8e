//! Calendar projection of a schedule for Gantt charts.

use chrono::{Days, NaiveDate};
use pyo3::prelude::*;

use crate::graph::{Graph, NodeId};

use super::types::Schedule;

/// One bar of a Gantt chart.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct GanttRow {
    #[pyo3(get)]
    pub node: NodeId,
    #[pyo3(get)]
    pub label: String,
    #[pyo3(get)]
    pub sequence: u32,
    #[pyo3(get)]
    pub start: u64,
    #[pyo3(get)]
    pub finish: u64,
    #[pyo3(get)]
    pub start_date: NaiveDate,
    #[pyo3(get)]
    pub finish_date: NaiveDate,
    #[pyo3(get)]
    pub critical: bool,
    /// Zero-duration task, drawn as a marker rather than a bar.
    #[pyo3(get)]
    pub milestone: bool,
}

#[pymethods]
impl GanttRow {
    fn __repr__(&self) -> String {
        format!(
            "GanttRow({}. {}, {} -> {}, critical={})",
            self.sequence, self.label, self.start_date, self.finish_date, self.critical
        )
    }
}

/// Project day offsets onto the calendar, starting at `project_start`.
///
/// Dates past the end of the calendar saturate to `NaiveDate::MAX`.
fn offset_date(project_start: NaiveDate, days: u64) -> NaiveDate {
    project_start
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Rows for every scheduled task, in sequence order.
///
/// Tasks left unsorted by a cycle have no timing and get no row.
pub fn gantt_rows(graph: &Graph, schedule: &Schedule, project_start: NaiveDate) -> Vec<GanttRow> {
    schedule
        .order
        .iter()
        .enumerate()
        .filter_map(|(sequence, &node)| {
            let timing = schedule.timing(node)?;
            let task = graph.node(node)?;
            Some(GanttRow {
                node,
                label: task.label.clone(),
                sequence: sequence as u32,
                start: timing.earliest_start,
                finish: timing.earliest_finish,
                start_date: offset_date(project_start, timing.earliest_start),
                finish_date: offset_date(project_start, timing.earliest_finish),
                critical: schedule.is_critical(node),
                milestone: task.duration == 0,
            })
        })
        .collect()
}
