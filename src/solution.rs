//! Per-ant tour results.
//!
//! A route always starts and ends at the start station. A complete route has
//! length n+1 and visits every other station exactly once; a partial route stops
//! early because selection degenerated, and still carries its closing edge.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether an ant visited every station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TourStatus {
    Complete,
    /// Construction stopped at `stalled_at` with `unvisited` stations left over.
    Partial {
        stalled_at: usize,
        unvisited: Vec<usize>,
    },
}

impl TourStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, TourStatus::Complete)
    }
}

/// Outcome of one ant's traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntResult {
    /// Station indices, first = last = start
    pub route: Vec<usize>,
    /// Sum of every traversed edge including the closing one
    pub total_distance: f64,
    /// 1 / total_distance
    pub deposit: f64,
    pub status: TourStatus,
}

impl AntResult {
    /// Consecutive directed edges of the route, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.route.windows(2).map(|w| (w[0], w[1]))
    }

    /// Check that the route is a closed tour over `n` stations visiting each
    /// station other than the start exactly once.
    pub fn is_hamiltonian(&self, n: usize) -> bool {
        if self.route.len() != n + 1 {
            return false;
        }
        let (first, last) = match (self.route.first(), self.route.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return false,
        };
        if first != last {
            return false;
        }

        let inner = &self.route[..n];
        let unique: HashSet<usize> = inner.iter().cloned().collect();
        unique.len() == n && inner.iter().all(|&s| s < n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(route: Vec<usize>) -> AntResult {
        AntResult { route, total_distance: 1.0, deposit: 1.0, status: TourStatus::Complete }
    }

    #[test]
    fn test_edges_include_closing_edge() {
        let r = result(vec![0, 2, 1, 0]);
        let edges: Vec<_> = r.edges().collect();
        assert_eq!(edges, vec![(0, 2), (2, 1), (1, 0)]);
    }

    #[test]
    fn test_hamiltonian_check() {
        assert!(result(vec![1, 0, 2, 1]).is_hamiltonian(3));
        assert!(!result(vec![0, 1, 0]).is_hamiltonian(3));
        assert!(!result(vec![0, 1, 1, 0]).is_hamiltonian(3));
        assert!(!result(vec![0, 1, 2, 1]).is_hamiltonian(3));
    }

    #[test]
    fn test_status_serialization() {
        let partial = TourStatus::Partial { stalled_at: 2, unvisited: vec![3] };
        let json = serde_json::to_string(&partial).unwrap();
        assert!(json.contains("\"kind\":\"partial\""));
        let back: TourStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, partial);
        assert!(!back.is_complete());
    }
}
