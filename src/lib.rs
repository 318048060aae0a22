//! Ant colony optimization for the traveling salesman problem.
//!
//! A colony of ants builds Hamiltonian cycles over a shared
//! [`DistanceGraph`], biased by pheromone trails that evaporate and get
//! re-deposited once per iteration. Optional 2-opt local search refines
//! every completed tour. Construction runs one rayon task per ant; the
//! pheromone update only starts after the whole generation has finished.

pub mod ant;
pub mod colony;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod two_opt;

pub use colony::{Colony, IterationSnapshot, SolverObserver, TourResult};
pub use config::AcoConfig;
pub use error::AcoError;
pub use graph::{DistanceGraph, Node, PheromoneLevel};

/// Prints the running best once per iteration.
struct ProgressPrinter;

impl SolverObserver for ProgressPrinter {
    fn on_iteration_complete(&mut self, snapshot: &IterationSnapshot) {
        println!(
            "Iter {}/{}: best tour length so far: {:.2}",
            snapshot.iteration + 1,
            snapshot.total_iterations,
            snapshot.best_distance
        );
    }
}

/// Loads the configured TSPLIB file, builds the complete distance
/// graph, and runs the colony to completion.
pub fn run(config: &AcoConfig) -> Result<TourResult, AcoError> {
    let file_path = config.file_path.as_deref().ok_or_else(|| {
        AcoError::InvalidConfiguration("no tsp file path provided".into())
    })?;
    let instance = parser::parse_tsp_file(file_path)?;
    println!(
        "Loaded problem \"{}\" with {} nodes",
        instance.name, instance.dimension
    );

    let graph = DistanceGraph::complete(instance.nodes)?;
    let mut colony = Colony::new(graph, config.clone())?;
    let result = colony.solve_with_observer(&mut ProgressPrinter)?;

    let ids: Vec<usize> = result
        .path
        .iter()
        .map(|&idx| colony.graph().nodes()[idx].id)
        .collect();
    println!(
        "Best tour length: {:.2}, path: {:?}",
        result.distance, ids
    );

    Ok(result)
}
