use std::error::Error;
use std::fmt;

/// Failures that abort a solve. None of these are recovered from at the
/// colony level; the caller either gets a completed tour or one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum AcoError {
    /// Queried a node pair that has no edge in the graph.
    UnknownEdge { u: usize, v: usize },
    /// Zero or negative edge weight; `1 / weight` would be meaningless.
    InvalidWeight { u: usize, v: usize, weight: f64 },
    /// An ant could not reach every node from its start node.
    GraphConnectivity {
        start: usize,
        visited: usize,
        total: usize,
    },
    /// Rejected before any iteration runs.
    InvalidConfiguration(String),
    /// Malformed TSPLIB input.
    Parse(String),
}

impl fmt::Display for AcoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcoError::UnknownEdge { u, v } => {
                write!(f, "no edge between nodes {u} and {v}")
            }
            AcoError::InvalidWeight { u, v, weight } => {
                write!(f, "invalid weight {weight} on edge ({u}, {v})")
            }
            AcoError::GraphConnectivity {
                start,
                visited,
                total,
            } => {
                write!(
                    f,
                    "only {visited} of {total} nodes reachable from start node {start}"
                )
            }
            AcoError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {msg}")
            }
            AcoError::Parse(msg) => write!(f, "failed to parse tsp file: {msg}"),
        }
    }
}

impl Error for AcoError {}
