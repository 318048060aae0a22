use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::AcoError;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

/// Unrounded Euclidean distance between two nodes.
pub fn euclidean(a: &Node, b: &Node) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Pheromone level of one edge, as exposed to observers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PheromoneLevel {
    pub u: usize,
    pub v: usize,
    pub level: f64,
}

/// Canonical key for an undirected edge: `(u, v)` and `(v, u)` must
/// resolve to the same weight and pheromone entry.
fn edge_key(u: usize, v: usize) -> (usize, usize) {
    if u <= v { (u, v) } else { (v, u) }
}

/// Undirected graph over the problem's nodes: immutable coordinates and
/// edge weights, plus the colony's shared mutable pheromone map.
///
/// Weights and adjacency are fixed at build time and read lock-free.
/// Pheromone lives behind a single `RwLock`: ants take concurrent read
/// locks while constructing, the coordinator takes the write lock for
/// decay, and `add_pheromone` holds the write lock across its whole
/// read-modify-write so concurrent deposits on one edge never lose an
/// update.
#[derive(Debug)]
pub struct DistanceGraph {
    nodes: Vec<Node>,
    neighbors: Vec<Vec<usize>>,
    weights: HashMap<(usize, usize), f64>,
    pheromone: RwLock<HashMap<(usize, usize), f64>>,
}

impl DistanceGraph {
    /// Builds the complete graph over `nodes` with unrounded Euclidean
    /// weights. Every pair of distinct nodes must be strictly apart;
    /// coincident coordinates would give a zero weight and a division by
    /// zero in the attractiveness term.
    pub fn complete(nodes: Vec<Node>) -> Result<Self, AcoError> {
        let n = nodes.len();
        let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for u in 0..n {
            for v in u + 1..n {
                edges.push((u, v));
            }
        }
        Self::with_edges(nodes, &edges)
    }

    /// Builds a near-complete graph restricted to the given undirected
    /// edge list. Weights are the unrounded Euclidean distances.
    pub fn with_edges(nodes: Vec<Node>, edges: &[(usize, usize)]) -> Result<Self, AcoError> {
        let n = nodes.len();
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut weights = HashMap::with_capacity(edges.len());
        let mut pheromone = HashMap::with_capacity(edges.len());

        for &(u, v) in edges {
            if u >= n || v >= n || u == v {
                return Err(AcoError::InvalidConfiguration(format!(
                    "edge ({u}, {v}) is not a pair of distinct nodes in 0..{n}"
                )));
            }
            let key = edge_key(u, v);
            if weights.contains_key(&key) {
                continue;
            }
            let weight = euclidean(&nodes[u], &nodes[v]);
            if weight <= 0.0 {
                return Err(AcoError::InvalidWeight { u, v, weight });
            }
            weights.insert(key, weight);
            pheromone.insert(key, 0.0);
            neighbors[u].push(v);
            neighbors[v].push(u);
        }

        Ok(DistanceGraph {
            nodes,
            neighbors,
            weights,
            pheromone: RwLock::new(pheromone),
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes directly reachable from `node`, excluding `node` itself.
    pub fn connected_nodes(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    /// Precomputed distance of the edge `(u, v)`, symmetric in argument
    /// order.
    pub fn edge_weight(&self, u: usize, v: usize) -> Result<f64, AcoError> {
        self.weights
            .get(&edge_key(u, v))
            .copied()
            .ok_or(AcoError::UnknownEdge { u, v })
    }

    /// Current pheromone level of the edge `(u, v)`, symmetric in
    /// argument order.
    pub fn edge_pheromone(&self, u: usize, v: usize) -> Result<f64, AcoError> {
        self.read_pheromone()
            .get(&edge_key(u, v))
            .copied()
            .ok_or(AcoError::UnknownEdge { u, v })
    }

    /// Overwrites the pheromone level of the edge `(u, v)`. The decay
    /// rule keeps values non-negative as long as `rho` stays in `[0, 1)`.
    pub fn set_pheromone(&self, u: usize, v: usize, value: f64) -> Result<(), AcoError> {
        match self.write_pheromone().get_mut(&edge_key(u, v)) {
            Some(level) => {
                *level = value;
                Ok(())
            }
            None => Err(AcoError::UnknownEdge { u, v }),
        }
    }

    /// Adds `delta` to the edge's pheromone level. The write lock is held
    /// across the whole read-modify-write, so concurrent deposits on the
    /// same edge cannot interleave.
    pub fn add_pheromone(&self, u: usize, v: usize, delta: f64) -> Result<(), AcoError> {
        match self.write_pheromone().get_mut(&edge_key(u, v)) {
            Some(level) => {
                *level += delta;
                Ok(())
            }
            None => Err(AcoError::UnknownEdge { u, v }),
        }
    }

    /// Snapshot of all edge keys, for iterating during the decay pass.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges: Vec<(usize, usize)> = self.weights.keys().copied().collect();
        edges.sort_unstable();
        edges
    }

    /// Per-edge pheromone levels, for the visualization observer.
    pub fn pheromone_snapshot(&self) -> Vec<PheromoneLevel> {
        let map = self.read_pheromone();
        let mut levels: Vec<PheromoneLevel> = map
            .iter()
            .map(|(&(u, v), &level)| PheromoneLevel { u, v, level })
            .collect();
        levels.sort_unstable_by_key(|p| (p.u, p.v));
        levels
    }

    fn read_pheromone(&self) -> std::sync::RwLockReadGuard<'_, HashMap<(usize, usize), f64>> {
        // A poisoned lock still holds usable pheromone state.
        self.pheromone
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_pheromone(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<(usize, usize), f64>> {
        self.pheromone
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
