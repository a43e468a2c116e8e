//! Text loaders that build a `Graph`.
//!
//! Two line-oriented formats are understood:
//!
//! Task lists, one task per non-empty line:
//! ```text
//! 0, 0, Start, []
//! 1, 3, Design, [0]
//! 2, 5, Build, [1]
//! ```
//! `index, duration, name, [prerequisite indices]`. Indices must be dense and
//! in order; every prerequisite `p` of task `t` becomes an edge `p -> t`.
//! The duration may be left out (`1, Design, [0]`), in which case it is zero;
//! a second field that does not start with a digit or sign is the name.
//!
//! Networks:
//! ```text
//! 4          # node count
//! 4          # link count
//! 10,10,A    # x,y,label (coordinates are ignored)
//! 0,1,10     # from,to,weight
//! ```
//! Each link weight becomes both the edge's cost and its capacity.

use std::path::Path;
use thiserror::Error;

use crate::graph::{Edge, Graph, GraphError, Node, NodeId};

/// Largest node or link count a network header may declare.
const MAX_COUNT: usize = NodeId::MAX as usize;

/// Largest task duration accepted. Latest start and finish times are `i64`.
const MAX_DURATION: u64 = i64::MAX as u64;

/// Errors raised while reading graph text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: expected task index {expected}, found {found}")]
    IndexOutOfOrder {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("expected {expected} {what}, found {found}")]
    Truncated {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn parse_field<T: std::str::FromStr>(line: usize, field: &str, what: &str) -> Result<T, LoadError> {
    field.parse().map_err(|_| LoadError::Parse {
        line,
        message: format!("invalid {what}: {field:?}"),
    })
}

fn parse_weight(line: usize, field: &str) -> Result<f64, LoadError> {
    let weight: f64 = parse_field(line, field, "weight")?;
    if !weight.is_finite() || weight < 0.0 {
        return Err(LoadError::Parse {
            line,
            message: format!("weight must be finite and nonnegative: {field:?}"),
        });
    }
    Ok(weight)
}

/// Whether the second task field is a duration rather than the task name.
fn has_duration(field: &str) -> bool {
    field.starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+')
}

fn parse_duration(line: usize, field: &str) -> Result<u64, LoadError> {
    let duration: u64 = parse_field(line, field, "duration")?;
    if duration > MAX_DURATION {
        return Err(LoadError::Parse {
            line,
            message: format!("duration {duration} exceeds {MAX_DURATION}"),
        });
    }
    Ok(duration)
}

/// Split on the separators both formats use, dropping empty fields.
fn split_fields(text: &str) -> Vec<&str> {
    text.split([',', '[', ']', '(', ')'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Non-empty lines with `#` comments removed, numbered from 1.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let line = raw.split('#').next().unwrap_or("").trim();
        (!line.is_empty()).then_some((i + 1, line))
    })
}

/// Parse a task list into a scheduling graph.
pub fn parse_task_list(text: &str) -> Result<Graph, LoadError> {
    let mut graph = Graph::new();
    let mut prereqs: Vec<(usize, NodeId, Vec<NodeId>)> = Vec::new();

    for (line, content) in content_lines(text) {
        let fields = split_fields(content);
        if fields.len() < 2 {
            return Err(LoadError::Parse {
                line,
                message: "expected `index, [duration,] name, [prerequisites]`".to_string(),
            });
        }

        let index: usize = parse_field(line, fields[0], "task index")?;
        let expected = graph.node_count();
        if index != expected {
            return Err(LoadError::IndexOutOfOrder {
                line,
                expected,
                found: index,
            });
        }

        let (duration, name, rest) = if has_duration(fields[1]) {
            let Some(&name) = fields.get(2) else {
                return Err(LoadError::Parse {
                    line,
                    message: "missing task name after duration".to_string(),
                });
            };
            (parse_duration(line, fields[1])?, name, &fields[3..])
        } else {
            (0, fields[1], &fields[2..])
        };
        let id = graph.add_node(Node::task(name, duration));

        let numbers = rest
            .iter()
            .map(|f| parse_field(line, f, "prerequisite index"))
            .collect::<Result<Vec<NodeId>, _>>()?;
        prereqs.push((line, id, numbers));
    }

    // Prerequisites may refer forward, so edges are added once all tasks exist.
    for (line, task, numbers) in prereqs {
        for prereq in numbers {
            graph
                .add_edge(Edge::new(prereq, task))
                .map_err(|err| match err {
                    GraphError::InvalidReference { node, node_count } => LoadError::Parse {
                        line,
                        message: format!(
                            "prerequisite {node} does not exist ({node_count} tasks)"
                        ),
                    },
                })?;
        }
    }

    Ok(graph)
}

/// Parse a network description into a graph.
pub fn parse_network(text: &str) -> Result<Graph, LoadError> {
    let mut lines = content_lines(text);

    let mut read_count = |what: &'static str| -> Result<usize, LoadError> {
        let Some((line, content)) = lines.next() else {
            return Ok(0);
        };
        let count: usize = parse_field(line, content, what)?;
        if count > MAX_COUNT {
            return Err(LoadError::Parse {
                line,
                message: format!("{what} {count} exceeds {MAX_COUNT}"),
            });
        }
        Ok(count)
    };
    let node_count = read_count("node count")?;
    let link_count = read_count("link count")?;

    // Counts come from the file; grow as lines are read instead of trusting them.
    let mut graph = Graph::new();

    for found in 0..node_count {
        let Some((line, content)) = lines.next() else {
            return Err(LoadError::Truncated {
                what: "nodes",
                expected: node_count,
                found,
            });
        };
        let fields = split_fields(content);
        if fields.len() < 3 {
            return Err(LoadError::Parse {
                line,
                message: "expected `x,y,label`".to_string(),
            });
        }
        let _x: f64 = parse_field(line, fields[0], "x coordinate")?;
        let _y: f64 = parse_field(line, fields[1], "y coordinate")?;
        graph.add_node(Node::new(fields[2]));
    }

    for found in 0..link_count {
        let Some((line, content)) = lines.next() else {
            return Err(LoadError::Truncated {
                what: "links",
                expected: link_count,
                found,
            });
        };
        let fields = split_fields(content);
        if fields.len() < 3 {
            return Err(LoadError::Parse {
                line,
                message: "expected `from,to,weight`".to_string(),
            });
        }
        let from: NodeId = parse_field(line, fields[0], "from index")?;
        let to: NodeId = parse_field(line, fields[1], "to index")?;
        let weight = parse_weight(line, fields[2])?;
        graph.add_edge(Edge::weighted(from, to, weight))?;
    }

    Ok(graph)
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|err| LoadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

pub fn load_task_list(path: impl AsRef<Path>) -> Result<Graph, LoadError> {
    parse_task_list(&read_file(path.as_ref())?)
}

pub fn load_network(path: impl AsRef<Path>) -> Result<Graph, LoadError> {
    parse_network(&read_file(path.as_ref())?)
}
