use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::ant::Ant;
use crate::config::AcoConfig;
use crate::error::AcoError;
use crate::graph::{DistanceGraph, PheromoneLevel};

/// State handed to the observer once per completed iteration. The
/// pheromone levels are what a visualizer scales edge widths with.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IterationSnapshot {
    /// Zero-based index of the iteration that just completed.
    pub iteration: usize,
    pub total_iterations: usize,
    pub best_path: Vec<usize>,
    pub best_distance: f64,
    pub pheromone: Vec<PheromoneLevel>,
}

/// Iteration consumer, injected by the caller. Stands in for the
/// animation layer without the colony knowing anything about rendering.
pub trait SolverObserver {
    fn on_iteration_complete(&mut self, snapshot: &IterationSnapshot);
}

/// Final outcome of a solve.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourResult {
    /// Best node sequence found (origin repeated at the end).
    pub path: Vec<usize>,
    pub distance: f64,
    pub iterations_run: usize,
    /// True when a stop signal ended the run before all iterations.
    pub cancelled: bool,
}

/// Coordinates the colony: spawns ants, synchronizes on their
/// completion, applies the global pheromone update, and tracks the
/// best-known tour.
///
/// Each iteration runs every ant's construction as one rayon task; the
/// parallel iterator only returns once all ants are done, which is the
/// barrier that keeps decay and deposits invisible until the whole
/// generation has finished reading the pheromone landscape.
pub struct Colony {
    graph: DistanceGraph,
    config: AcoConfig,
    ants: Vec<Ant>,
    rng: StdRng,
    best_path: Vec<usize>,
    best_edges: Vec<(usize, usize)>,
    best_distance: Option<f64>,
}

impl Colony {
    /// Validates the configuration, seeds the master RNG, and creates
    /// `ant_number` ants on uniformly random start nodes.
    pub fn new(graph: DistanceGraph, config: AcoConfig) -> Result<Self, AcoError> {
        config.validate()?;
        let node_count = graph.node_count();
        if node_count == 0 {
            return Err(AcoError::InvalidConfiguration(
                "graph has no nodes".into(),
            ));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let ants = (0..config.ant_number)
            .map(|_| {
                Ant::new(
                    rng.random_range(0..node_count),
                    node_count,
                    config.alpha,
                    config.beta,
                    config.q,
                    config.two_opt,
                    StdRng::seed_from_u64(rng.random()),
                )
            })
            .collect();

        Ok(Colony {
            graph,
            config,
            ants,
            rng,
            best_path: Vec::new(),
            best_edges: Vec::new(),
            best_distance: None,
        })
    }

    pub fn graph(&self) -> &DistanceGraph {
        &self.graph
    }

    /// Best tour found so far, if any iteration has completed.
    pub fn best(&self) -> Option<(&[usize], f64)> {
        self.best_distance
            .map(|distance| (self.best_path.as_slice(), distance))
    }

    /// Edges defining the current best tour.
    pub fn best_edges(&self) -> &[(usize, usize)] {
        &self.best_edges
    }

    pub fn solve(&mut self) -> Result<TourResult, AcoError> {
        self.solve_with_cancel(None, None)
    }

    pub fn solve_with_observer(
        &mut self,
        observer: &mut dyn SolverObserver,
    ) -> Result<TourResult, AcoError> {
        self.solve_with_cancel(Some(observer), None)
    }

    /// Runs the full iteration loop. A raised stop flag is honored
    /// between iterations only; an iteration that has started always
    /// finishes its barrier and pheromone update.
    pub fn solve_with_cancel(
        &mut self,
        mut observer: Option<&mut dyn SolverObserver>,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<TourResult, AcoError> {
        let total_iterations = self.config.iteration_number;
        let mut iterations_run = 0;
        let mut cancelled = false;

        for iteration in 0..total_iterations {
            if let Some(flag) = &cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            // Construct all tours in parallel; the iterator returning is
            // the completion barrier. Any ant failure aborts the solve
            // before the pheromone update.
            let graph = &self.graph;
            self.ants
                .par_iter_mut()
                .try_for_each(|ant| ant.construct(graph))?;

            self.evaporate()?;

            // Deposits are additive, so ant order does not matter. Best
            // tracking uses strict `<`: the first ant to reach a length
            // keeps it against later ties.
            for ant in &self.ants {
                ant.spawn_pheromone(&self.graph)?;

                let shorter = match self.best_distance {
                    Some(best) => ant.traveled_distance() < best,
                    None => true,
                };
                if shorter {
                    self.best_distance = Some(ant.traveled_distance());
                    self.best_path = ant.traveled_nodes().to_vec();
                    self.best_edges = ant.traveled_edges().to_vec();
                }
            }

            let node_count = self.graph.node_count();
            for ant in &mut self.ants {
                ant.reset(self.rng.random_range(0..node_count));
            }

            iterations_run = iteration + 1;
            if let Some(observer) = observer.as_mut() {
                let snapshot = IterationSnapshot {
                    iteration,
                    total_iterations,
                    best_path: self.best_path.clone(),
                    best_distance: self.best_distance.unwrap_or(f64::INFINITY),
                    pheromone: self.graph.pheromone_snapshot(),
                };
                observer.on_iteration_complete(&snapshot);
            }
        }

        Ok(TourResult {
            path: self.best_path.clone(),
            distance: self.best_distance.unwrap_or(0.0),
            iterations_run,
            cancelled,
        })
    }

    /// Multiplies every edge's pheromone by `1 - rho`, exactly once per
    /// iteration, before any deposit lands.
    fn evaporate(&self) -> Result<(), AcoError> {
        let keep = 1.0 - self.config.rho;
        for (u, v) in self.graph.edges() {
            let pheromone = self.graph.edge_pheromone(u, v)?;
            self.graph.set_pheromone(u, v, pheromone * keep)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;
    use std::collections::HashMap;

    fn unit_square() -> DistanceGraph {
        DistanceGraph::complete(vec![
            Node { id: 0, x: 0.0, y: 0.0 },
            Node { id: 1, x: 1.0, y: 0.0 },
            Node { id: 2, x: 1.0, y: 1.0 },
            Node { id: 3, x: 0.0, y: 1.0 },
        ])
        .unwrap()
    }

    #[derive(Default)]
    struct Recorder {
        snapshots: Vec<IterationSnapshot>,
    }

    impl SolverObserver for Recorder {
        fn on_iteration_complete(&mut self, snapshot: &IterationSnapshot) {
            self.snapshots.push(snapshot.clone());
        }
    }

    #[test]
    fn rejects_invalid_configuration_before_running() {
        let config = AcoConfig::default().with_ant_number(0);
        assert!(matches!(
            Colony::new(unit_square(), config),
            Err(AcoError::InvalidConfiguration(_))
        ));

        let config = AcoConfig::default().with_rho(1.0);
        assert!(Colony::new(unit_square(), config).is_err());
    }

    #[test]
    fn rejects_empty_graph() {
        let graph = DistanceGraph::complete(Vec::new()).unwrap();
        assert!(Colony::new(graph, AcoConfig::default()).is_err());
    }

    #[test]
    fn unit_square_with_two_opt_converges_to_perimeter() {
        let config = AcoConfig::default()
            .with_rho(0.5)
            .with_alpha(1.0)
            .with_beta(1.0)
            .with_q(1.0)
            .with_ant_number(4)
            .with_iteration_number(5)
            .with_two_opt(true)
            .with_seed(42);

        let mut colony = Colony::new(unit_square(), config).unwrap();
        let result = colony.solve().unwrap();

        assert!((result.distance - 4.0).abs() < 1e-9);
        assert_eq!(result.path.len(), 5);
        assert_eq!(result.path[0], result.path[4]);
        assert_eq!(result.iterations_run, 5);
        assert!(!result.cancelled);
    }

    #[test]
    fn best_distance_is_non_increasing_across_iterations() {
        let config = AcoConfig::default()
            .with_ant_number(6)
            .with_iteration_number(12)
            .with_seed(7);

        let mut colony = Colony::new(unit_square(), config).unwrap();
        let mut recorder = Recorder::default();
        colony.solve_with_observer(&mut recorder).unwrap();

        assert_eq!(recorder.snapshots.len(), 12);
        for window in recorder.snapshots.windows(2) {
            assert!(window[1].best_distance <= window[0].best_distance);
        }
    }

    #[test]
    fn evaporation_is_multiplicative_and_edge_complete() {
        // One ant, no 2-opt, q = 1: after iteration 1 every edge holds
        // either 0 or its fresh deposit; after iteration 2 every edge
        // must equal its previous level times (1 - rho) plus whatever
        // the second tour deposited.
        let rho = 0.25;
        let config = AcoConfig::default()
            .with_rho(rho)
            .with_q(1.0)
            .with_ant_number(1)
            .with_iteration_number(2)
            .with_seed(3);

        let mut colony = Colony::new(unit_square(), config).unwrap();
        let mut recorder = Recorder::default();
        colony.solve_with_observer(&mut recorder).unwrap();

        let weights: HashMap<(usize, usize), f64> = colony
            .graph()
            .edges()
            .into_iter()
            .map(|(u, v)| ((u, v), colony.graph().edge_weight(u, v).unwrap()))
            .collect();

        let first: HashMap<(usize, usize), f64> = recorder.snapshots[0]
            .pheromone
            .iter()
            .map(|p| ((p.u, p.v), p.level))
            .collect();
        let second: HashMap<(usize, usize), f64> = recorder.snapshots[1]
            .pheromone
            .iter()
            .map(|p| ((p.u, p.v), p.level))
            .collect();

        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 6);

        for (edge, &level) in &second {
            let decayed = first[edge] * (1.0 - rho);
            let deposited = level - decayed;
            // The residual is the second tour's deposit: either nothing
            // or exactly 1 / weight for a single ant with q = 1.
            let on_tour = (deposited - 1.0 / weights[edge]).abs() < 1e-9;
            let off_tour = deposited.abs() < 1e-9;
            assert!(
                on_tour || off_tour,
                "edge {edge:?}: level {level} does not decompose into decay + deposit"
            );
        }
    }

    #[test]
    fn first_iteration_pheromone_is_deposit_only() {
        // Initial pheromone is zero, so after one iteration with one ant
        // each edge is either untouched or carries exactly q / weight.
        let config = AcoConfig::default()
            .with_q(2.0)
            .with_ant_number(1)
            .with_iteration_number(1)
            .with_seed(11);

        let mut colony = Colony::new(unit_square(), config).unwrap();
        let mut recorder = Recorder::default();
        colony.solve_with_observer(&mut recorder).unwrap();

        let tour_edges: Vec<(usize, usize)> = colony
            .best_edges()
            .iter()
            .map(|&(u, v)| if u <= v { (u, v) } else { (v, u) })
            .collect();

        for level in &recorder.snapshots[0].pheromone {
            let weight = colony.graph().edge_weight(level.u, level.v).unwrap();
            if tour_edges.contains(&(level.u, level.v)) {
                assert!((level.level - 2.0 / weight).abs() < 1e-9);
            } else {
                assert_eq!(level.level, 0.0);
            }
        }
    }

    #[test]
    fn disconnected_graph_aborts_the_solve() {
        let nodes = vec![
            Node { id: 0, x: 0.0, y: 0.0 },
            Node { id: 1, x: 1.0, y: 0.0 },
            Node { id: 2, x: 9.0, y: 9.0 },
            Node { id: 3, x: 8.0, y: 9.0 },
        ];
        let graph = DistanceGraph::with_edges(nodes, &[(0, 1), (2, 3)]).unwrap();
        let config = AcoConfig::default().with_seed(1);

        let mut colony = Colony::new(graph, config).unwrap();
        let err = colony.solve().unwrap_err();
        assert!(matches!(err, AcoError::GraphConnectivity { .. }));
    }

    #[test]
    fn pre_raised_stop_flag_cancels_before_the_first_iteration() {
        let config = AcoConfig::default().with_seed(5);
        let mut colony = Colony::new(unit_square(), config).unwrap();

        let cancel = Arc::new(AtomicBool::new(true));
        let result = colony.solve_with_cancel(None, Some(cancel)).unwrap();

        assert!(result.cancelled);
        assert_eq!(result.iterations_run, 0);
        assert!(result.path.is_empty());
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let config = AcoConfig::default()
            .with_ant_number(5)
            .with_iteration_number(8)
            .with_seed(99);

        let mut first = Colony::new(unit_square(), config.clone()).unwrap();
        let mut second = Colony::new(unit_square(), config).unwrap();

        let a = first.solve().unwrap();
        let b = second.solve().unwrap();
        assert_eq!(a.path, b.path);
        assert_eq!(a.distance, b.distance);
    }

    #[test]
    fn snapshot_carries_iteration_indices() {
        let config = AcoConfig::default()
            .with_iteration_number(3)
            .with_seed(2);
        let mut colony = Colony::new(unit_square(), config).unwrap();
        let mut recorder = Recorder::default();
        colony.solve_with_observer(&mut recorder).unwrap();

        for (idx, snapshot) in recorder.snapshots.iter().enumerate() {
            assert_eq!(snapshot.iteration, idx);
            assert_eq!(snapshot.total_iterations, 3);
        }
    }
}
