//! Critical path (PERT) scheduling.
//!
//! Nodes are tasks with integer durations and edges are "must finish before"
//! constraints. The scheduler orders tasks in ready waves, computes earliest
//! start/finish times in that order, and marks the zero-slack chains leading
//! into the finish task as critical.

mod calculation;
mod gantt;
mod types;

pub use calculation::{schedule, ScheduleError};
pub use gantt::{gantt_rows, GanttRow};
pub use types::{NodeTiming, Schedule};
