//! Critical path calculation using wave-ordered forward and backward passes.

use std::collections::VecDeque;
use thiserror::Error;

use crate::config::ScheduleConfig;
use crate::graph::{Graph, GraphError, NodeId};
use crate::topological::{unsorted_report, verify_sort, Prerequisites, SortError};
use crate::{log_changes, log_checks, log_debug};

use super::types::{to_signed, NodeTiming, Schedule};

/// Errors that can occur while scheduling.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Sort(#[from] SortError),
    #[error("Invalid finish node: {0}")]
    InvalidFinish(#[from] GraphError),
}

/// Prerequisite nodes of every node, one entry per incoming edge.
fn build_prerequisite_lists(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut prereqs = vec![Vec::new(); graph.node_count()];
    for edge in graph.edges() {
        prereqs[edge.to as usize].push(edge.from);
    }
    prereqs
}

/// Schedule every task and trace the critical path.
///
/// Nodes are processed in waves: a wave holds every node that became ready
/// while the previous wave was drained. A node only becomes ready once all of
/// its prerequisites have been processed, so each prerequisite's earliest
/// finish is final before any follower reads it.
///
/// On a cyclic graph the nodes behind the cycle get no timing and the cycle is
/// reported in `Schedule::cycle`; this is not an error.
pub fn schedule(graph: &Graph, config: &ScheduleConfig) -> Result<Schedule, ScheduleError> {
    let verbosity = config.verbosity;
    let n = graph.node_count();
    if let Some(finish) = config.finish_node {
        graph.check_node(finish)?;
    }

    let prereq_lists = build_prerequisite_lists(graph);
    let mut prereqs = Prerequisites::build(graph);

    let mut order: Vec<NodeId> = Vec::with_capacity(n);
    let mut sequence: Vec<Option<u32>> = vec![None; n];
    let mut timings: Vec<Option<NodeTiming>> = vec![None; n];
    let mut waves: Vec<Vec<NodeId>> = Vec::new();

    let mut ready = prereqs.roots();
    let mut next_ready: VecDeque<NodeId> = VecDeque::new();
    let mut batch: Vec<NodeId> = Vec::new();

    // Forward pass
    while let Some(node) = ready.pop_front() {
        let duration = graph.node(node).map(|n| n.duration).unwrap_or(0);
        let earliest_start = prereq_lists[node as usize]
            .iter()
            .filter_map(|&p| timings[p as usize].map(|t| t.earliest_finish))
            .max()
            .unwrap_or(0);
        let earliest_finish = earliest_start.saturating_add(duration);

        timings[node as usize] = Some(NodeTiming {
            earliest_start,
            earliest_finish,
            latest_start: 0,
            latest_finish: 0,
        });
        log_checks!(
            verbosity,
            "Task {} ({}): start={} finish={}",
            graph.label(node),
            node,
            earliest_start,
            earliest_finish
        );

        sequence[node as usize] = Some(order.len() as u32);
        order.push(node);
        batch.push(node);
        prereqs.release(node, &mut next_ready);

        if ready.is_empty() {
            log_debug!(verbosity, "Wave {}: {:?}", waves.len(), batch);
            waves.push(std::mem::take(&mut batch));
            std::mem::swap(&mut ready, &mut next_ready);
        }
    }

    verify_sort(graph, &sequence)?;

    let finish = config.finish_node.or_else(|| order.last().copied());
    let makespan = finish
        .and_then(|node| timings[node as usize])
        .map(|t| t.earliest_finish)
        .unwrap_or(0);

    backward_pass(graph, &order, &mut timings, makespan);

    let mut critical = vec![false; n];
    if let Some(finish) = finish {
        mark_critical(finish, &prereq_lists, &timings, &mut critical);
    }

    let cycle = unsorted_report(&sequence);
    log_changes!(
        verbosity,
        "Scheduled {} of {} tasks in {} waves, makespan {}, {} critical",
        order.len(),
        n,
        waves.len(),
        makespan,
        critical.iter().filter(|&&c| c).count()
    );

    Ok(Schedule {
        order,
        sequence,
        waves,
        timings,
        critical,
        finish,
        cycle,
    })
}

/// Fill latest start/finish in reverse topological order.
///
/// A task's latest finish is the smallest latest start among its followers,
/// or the makespan if it has none.
fn backward_pass(
    graph: &Graph,
    order: &[NodeId],
    timings: &mut [Option<NodeTiming>],
    makespan: u64,
) {
    let makespan = to_signed(makespan);
    for &node in order.iter().rev() {
        let latest_finish = graph
            .outgoing(node)
            .filter_map(|(_, edge)| timings[edge.to as usize].map(|t| t.latest_start))
            .min()
            .unwrap_or(makespan);
        let duration = to_signed(graph.node(node).map(|n| n.duration).unwrap_or(0));

        if let Some(timing) = timings[node as usize].as_mut() {
            timing.latest_finish = latest_finish;
            timing.latest_start = latest_finish.saturating_sub(duration);
        }
    }
}

/// Mark `finish` critical, then every prerequisite whose earliest finish equals
/// the current task's earliest start. All such prerequisites are marked, so
/// parallel critical chains are all found.
fn mark_critical(
    finish: NodeId,
    prereq_lists: &[Vec<NodeId>],
    timings: &[Option<NodeTiming>],
    critical: &mut [bool],
) {
    if timings[finish as usize].is_none() {
        return;
    }

    critical[finish as usize] = true;
    let mut stack = vec![finish];

    while let Some(node) = stack.pop() {
        let Some(timing) = timings[node as usize] else {
            continue;
        };
        for &prereq in &prereq_lists[node as usize] {
            if critical[prereq as usize] {
                continue;
            }
            let on_path = timings[prereq as usize]
                .map(|t| t.earliest_finish == timing.earliest_start)
                .unwrap_or(false);
            if on_path {
                critical[prereq as usize] = true;
                stack.push(prereq);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn make_project(tasks: &[(&str, u64)], deps: &[(NodeId, NodeId)]) -> Graph {
        let mut graph = Graph::new();
        for &(label, duration) in tasks {
            graph.add_node(Node::task(label, duration));
        }
        for &(from, to) in deps {
            graph.add_edge(Edge::new(from, to)).unwrap();
        }
        graph
    }

    #[test]
    fn test_chain_unit_durations() {
        let graph = make_project(
            &[("A", 1), ("B", 1), ("C", 1), ("D", 1)],
            &[(0, 1), (1, 2), (2, 3)],
        );
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(result.order, vec![0, 1, 2, 3]);
        assert_eq!(result.makespan(), 4);
        assert_eq!(result.critical_nodes(), vec![0, 1, 2, 3]);
        assert_eq!(result.waves, vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn test_diamond_critical_branch() {
        // A=1, B=2, C=5, D=1; A->B, A->C, B->D, C->D
        let graph = make_project(
            &[("A", 1), ("B", 2), ("C", 5), ("D", 1)],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
        );
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(result.finish, Some(3));
        assert_eq!(result.makespan(), 7);
        assert!(result.is_critical(0));
        assert!(!result.is_critical(1));
        assert!(result.is_critical(2));
        assert!(result.is_critical(3));
        assert_eq!(result.waves, vec![vec![0], vec![1, 2], vec![3]]);

        let b = result.timing(1).unwrap();
        assert_eq!((b.earliest_start, b.earliest_finish), (1, 3));
        assert_eq!(b.slack(), 3);
        let c = result.timing(2).unwrap();
        assert_eq!(c.slack(), 0);
    }

    #[test]
    fn test_parallel_critical_paths_all_marked() {
        // Both branches take 4: A(1) -> B(3) -> D(1), A(1) -> C(3) -> D(1)
        let graph = make_project(
            &[("A", 1), ("B", 3), ("C", 3), ("D", 1)],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
        );
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(result.makespan(), 5);
        assert_eq!(result.critical_nodes(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_timing_waits_for_latest_prerequisite() {
        // D depends on a long chain and a short root; start is the max.
        let graph = make_project(
            &[("A", 2), ("B", 2), ("S", 1), ("D", 1)],
            &[(0, 1), (1, 3), (2, 3)],
        );
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        let d = result.timing(3).unwrap();
        assert_eq!(d.earliest_start, 4);
        assert_eq!(d.earliest_finish, 5);
        assert!(!result.is_critical(2));
    }

    #[test]
    fn test_explicit_finish_node() {
        let graph = make_project(
            &[("A", 2), ("B", 3), ("X", 10)],
            &[(0, 1)],
        );
        let config = ScheduleConfig {
            finish_node: Some(1),
            verbosity: 0,
        };
        let result = schedule(&graph, &config).unwrap();

        assert_eq!(result.finish, Some(1));
        assert_eq!(result.makespan(), 5);
        assert_eq!(result.critical_nodes(), vec![0, 1]);
        // X outlasts the chosen finish task, so its slack is negative.
        assert!(result.timing(2).unwrap().slack() < 0);
    }

    #[test]
    fn test_invalid_finish_node() {
        let graph = make_project(&[("A", 1)], &[]);
        let config = ScheduleConfig {
            finish_node: Some(5),
            verbosity: 0,
        };
        let result = schedule(&graph, &config);
        assert!(matches!(result, Err(ScheduleError::InvalidFinish(_))));
    }

    #[test]
    fn test_cycle_leaves_remainder_untimed() {
        // A -> B <-> C
        let graph = make_project(&[("A", 1), ("B", 1), ("C", 1)], &[(0, 1), (1, 2), (2, 1)]);
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(result.order, vec![0]);
        assert!(result.timing(1).is_none());
        assert_eq!(result.cycle.as_ref().map(|c| c.unsorted.clone()), Some(vec![1, 2]));
        // Finish defaults to the last sorted node.
        assert_eq!(result.finish, Some(0));
        assert_eq!(result.critical_nodes(), vec![0]);
    }

    #[test]
    fn test_zero_duration_milestones() {
        let graph = make_project(
            &[("Start", 0), ("Work", 3), ("End", 0)],
            &[(0, 1), (1, 2)],
        );
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(result.makespan(), 3);
        assert_eq!(result.critical_nodes(), vec![0, 1, 2]);
    }

    #[test]
    fn test_rerun_is_identical() {
        let graph = make_project(
            &[("A", 1), ("B", 2), ("C", 5), ("D", 1)],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
        );
        let first = schedule(&graph, &ScheduleConfig::default()).unwrap();
        let second = schedule(&graph, &ScheduleConfig::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let graph = make_project(&[("Long", u64::MAX), ("After", 1)], &[(0, 1)]);
        let result = schedule(&graph, &ScheduleConfig::default()).unwrap();

        assert_eq!(result.makespan(), u64::MAX);
        let after = result.timing(1).unwrap();
        assert_eq!(after.latest_finish, i64::MAX);
        assert_eq!(after.latest_start, i64::MAX - 1);
        let long = result.timing(0).unwrap();
        assert_eq!(long.latest_finish, i64::MAX - 1);
        assert_eq!(long.latest_start, -1);
    }
}
