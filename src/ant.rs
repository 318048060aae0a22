use rand::Rng;
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;

use crate::error::AcoError;
use crate::graph::DistanceGraph;
use crate::two_opt;

/// One tour-construction agent. Ants run in parallel within an
/// iteration, each owning its private tour state and RNG while sharing
/// the graph's pheromone map. An ant is reused across iterations via
/// [`Ant::reset`].
pub struct Ant {
    current_node: usize,
    traveled_nodes: Vec<usize>,
    traveled_edges: Vec<(usize, usize)>,
    traveled_distance: f64,
    visited: Vec<bool>,
    alpha: f64,
    beta: f64,
    q: f64,
    use_two_opt: bool,
    rng: StdRng,
}

impl Ant {
    pub fn new(
        start_node: usize,
        node_count: usize,
        alpha: f64,
        beta: f64,
        q: f64,
        use_two_opt: bool,
        rng: StdRng,
    ) -> Self {
        let mut ant = Ant {
            current_node: start_node,
            traveled_nodes: Vec::new(),
            traveled_edges: Vec::new(),
            traveled_distance: 0.0,
            visited: vec![false; node_count],
            alpha,
            beta,
            q,
            use_two_opt,
            rng,
        };
        ant.reset(start_node);
        ant
    }

    /// Clears all tour state and re-arms the ant at a new start node.
    pub fn reset(&mut self, start_node: usize) {
        self.current_node = start_node;
        self.traveled_nodes.clear();
        self.traveled_nodes.push(start_node);
        self.traveled_edges.clear();
        self.traveled_distance = 0.0;
        self.visited.fill(false);
        self.visited[start_node] = true;
    }

    /// Ordered visited nodes: origin first, origin again last once the
    /// cycle is closed.
    pub fn traveled_nodes(&self) -> &[usize] {
        &self.traveled_nodes
    }

    /// Edges traversed, in tour order, closing edge included.
    pub fn traveled_edges(&self) -> &[(usize, usize)] {
        &self.traveled_edges
    }

    pub fn traveled_distance(&self) -> f64 {
        self.traveled_distance
    }

    /// Builds one Hamiltonian cycle: repeatedly pick an unvisited
    /// neighbor by roulette-wheel selection, then close the cycle back
    /// to the origin and optionally refine with 2-opt.
    pub fn construct(&mut self, graph: &DistanceGraph) -> Result<(), AcoError> {
        loop {
            let candidates: Vec<usize> = graph
                .connected_nodes(self.current_node)
                .iter()
                .copied()
                .filter(|&node| !self.visited[node])
                .collect();
            if candidates.is_empty() {
                break;
            }
            let next = self.select_next(graph, &candidates)?;
            self.move_to(graph, next)?;
        }

        let total = graph.node_count();
        if self.traveled_nodes.len() < total {
            return Err(AcoError::GraphConnectivity {
                start: self.traveled_nodes[0],
                visited: self.traveled_nodes.len(),
                total,
            });
        }

        // A single-node graph yields a degenerate tour: no edges,
        // distance zero, nothing to close.
        if total > 1 {
            let origin = self.traveled_nodes[0];
            self.move_to(graph, origin)?;
        }

        if self.use_two_opt {
            let (refined, distance) =
                two_opt::refine(&self.traveled_nodes, |u, v| graph.edge_weight(u, v))?;
            self.traveled_edges = refined.windows(2).map(|pair| (pair[0], pair[1])).collect();
            self.traveled_distance = distance;
            self.current_node = *refined.last().unwrap_or(&self.current_node);
            self.traveled_nodes = refined;
        }

        Ok(())
    }

    /// Roulette-wheel pick among `candidates`, weighted by
    /// `pheromone^alpha * (1 / weight)^beta`. When every candidate
    /// scores zero (fresh pheromone map, degenerate exponents) the pick
    /// falls back to a uniform choice instead of dividing by zero.
    fn select_next(
        &mut self,
        graph: &DistanceGraph,
        candidates: &[usize],
    ) -> Result<usize, AcoError> {
        let mut attractiveness = Vec::with_capacity(candidates.len());
        let mut total = 0.0;
        for &node in candidates {
            let pheromone = graph.edge_pheromone(self.current_node, node)?;
            let weight = graph.edge_weight(self.current_node, node)?;
            if weight <= 0.0 {
                return Err(AcoError::InvalidWeight {
                    u: self.current_node,
                    v: node,
                    weight,
                });
            }
            let score = pheromone.powf(self.alpha) * (1.0 / weight).powf(self.beta);
            attractiveness.push((node, score));
            total += score;
        }

        if total == 0.0 {
            if let Some(&node) = candidates.choose(&mut self.rng) {
                return Ok(node);
            }
        }

        let threshold = self.rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for &(node, score) in &attractiveness {
            cumulative += score;
            if threshold <= cumulative {
                return Ok(node);
            }
        }
        // Rounding can leave the threshold just above the final sum.
        Ok(attractiveness[attractiveness.len() - 1].0)
    }

    fn move_to(&mut self, graph: &DistanceGraph, node: usize) -> Result<(), AcoError> {
        let weight = graph.edge_weight(self.current_node, node)?;
        self.traveled_distance += weight;
        self.traveled_edges.push((self.current_node, node));
        self.traveled_nodes.push(node);
        self.visited[node] = true;
        self.current_node = node;
        Ok(())
    }

    /// Lays `Q / weight` pheromone on every traveled edge of the
    /// finalized tour, closing edge included. Each update is an atomic
    /// read-modify-write against the shared graph.
    pub fn spawn_pheromone(&self, graph: &DistanceGraph) -> Result<(), AcoError> {
        for pair in self.traveled_nodes.windows(2) {
            let weight = graph.edge_weight(pair[0], pair[1])?;
            graph.add_pheromone(pair[0], pair[1], self.q / weight)?;
        }
        Ok(())
    }
}
