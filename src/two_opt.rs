//! 2-opt local search over a closed tour.
//!
//! Exhaustive scan: every `(i, k)` segment reversal is tried and each
//! strictly improving candidate immediately becomes the new comparison
//! baseline, so the result depends on the tour's start node but never
//! gets longer. Each reversal costs a full O(n) re-evaluation, which
//! makes one call O(n^3) in the worst case. With refinement enabled the
//! colony pays this once per ant per iteration; it dominates the runtime
//! on larger instances.

use crate::error::AcoError;

/// Improves a closed route (`route[0] == route[len - 1]`) by segment
/// reversal. Returns the best route found and its total length; the
/// returned length is never greater than the input's. Routes shorter
/// than four entries have no valid reversal and come back unchanged.
pub fn refine<F>(route: &[usize], mut edge_length: F) -> Result<(Vec<usize>, f64), AcoError>
where
    F: FnMut(usize, usize) -> Result<f64, AcoError>,
{
    let len = route.len();
    let mut best = route.to_vec();
    let mut best_distance = route_distance(&best, &mut edge_length)?;
    if len < 4 {
        return Ok((best, best_distance));
    }

    // The closing duplicate of the start node stays fixed, so reversals
    // only range over the interior of the sequence.
    for i in 1..len - 1 {
        for k in i + 1..len - 1 {
            let mut candidate = best.clone();
            candidate[i..=k].reverse();
            let distance = route_distance(&candidate, &mut edge_length)?;
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
    }

    Ok((best, best_distance))
}

fn route_distance<F>(route: &[usize], edge_length: &mut F) -> Result<f64, AcoError>
where
    F: FnMut(usize, usize) -> Result<f64, AcoError>,
{
    let mut distance = 0.0;
    for pair in route.windows(2) {
        distance += edge_length(pair[0], pair[1])?;
    }
    Ok(distance)
}
