//! One ant's traversal.

use rand::Rng;

use crate::colony::selection::ProbabilitySelector;
use crate::colony::trail::TrailMatrix;
use crate::error::{ColonyError, ColonyResult};
use crate::instance::DistanceMatrix;
use crate::solution::{AntResult, TourStatus};

/// Builds a single ant's route against a fixed trail matrix.
#[derive(Debug, Clone, Copy)]
pub struct TourBuilder<'a> {
    distances: &'a DistanceMatrix,
    selector: ProbabilitySelector,
}

impl<'a> TourBuilder<'a> {
    pub fn new(distances: &'a DistanceMatrix, selector: ProbabilitySelector) -> Self {
        TourBuilder { distances, selector }
    }

    /// Walk from `start` until every station is visited or selection degenerates,
    /// then close the loop back to `start`.
    ///
    /// A degenerate selection ends the walk early and yields a `Partial` result.
    /// A route of zero total length returns `ZeroTotalDistance`, since it has no
    /// finite deposit.
    pub fn build<R: Rng + ?Sized>(
        &self,
        start: usize,
        trail: &TrailMatrix,
        rng: &mut R,
    ) -> ColonyResult<AntResult> {
        let n = self.distances.dimension();
        if start >= n {
            return Err(ColonyError::invalid(format!(
                "start station {} is out of range for {} stations", start, n
            )));
        }
        if trail.dimension() != n {
            return Err(ColonyError::invalid(format!(
                "trail matrix is {}x{}, distance matrix is {}x{}",
                trail.dimension(), trail.dimension(), n, n
            )));
        }

        let mut route = Vec::with_capacity(n + 1);
        route.push(start);
        let mut visited = vec![false; n];
        visited[start] = true;

        let mut current = start;
        let mut total_distance = 0.0;
        let mut status = TourStatus::Complete;

        while route.len() < n {
            match self.selector.select(current, trail, self.distances, &visited, rng) {
                Ok(next) => {
                    total_distance += self.distances.distance(current, next);
                    route.push(next);
                    visited[next] = true;
                    current = next;
                }
                Err(ColonyError::NoFeasibleSuccessor { .. }) => {
                    let unvisited: Vec<usize> = (0..n).filter(|&s| !visited[s]).collect();
                    log::warn!(
                        "no feasible successor from station {}; {} station(s) left unvisited",
                        current, unvisited.len()
                    );
                    status = TourStatus::Partial { stalled_at: current, unvisited };
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        // Return to start
        total_distance += self.distances.distance(current, start);
        route.push(start);

        if !(total_distance > 0.0) {
            return Err(ColonyError::ZeroTotalDistance { route });
        }

        let deposit = 1.0 / total_distance;
        log::debug!("route {:?} length {:.4} deposit {:.6}", route, total_distance, deposit);

        Ok(AntResult { route, total_distance, deposit, status })
    }
}
