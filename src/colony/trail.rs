//! Shared trail-strength matrix.
//!
//! Entry `(i, j)` reinforces the directed edge `i -> j`. The two directions of an
//! edge are never coupled. Entries stay nonnegative: evaporation only scales by a
//! factor in (0, 1] and deposits must be finite and positive.

use serde::{Deserialize, Serialize};

use crate::error::{ColonyError, ColonyResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrailMatrix {
    strength: Vec<Vec<f64>>,
}

impl TrailMatrix {
    /// n×n matrix with every entry set to `initial`.
    pub fn new(n: usize, initial: f64) -> Self {
        TrailMatrix {
            strength: vec![vec![initial; n]; n],
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.strength.len()
    }

    /// Trail strength on the directed edge `i -> j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.strength[i][j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.strength[i]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.strength
    }

    /// Multiply every entry by `factor`.
    pub fn evaporate(&mut self, factor: f64) -> ColonyResult<()> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ColonyError::invalid(format!(
                "evaporation factor must lie in (0, 1], got {}", factor
            )));
        }
        for row in self.strength.iter_mut() {
            for value in row.iter_mut() {
                *value *= factor;
            }
        }
        Ok(())
    }

    /// Add `amount` to every consecutive directed pair of `route`. When
    /// `include_closing_edge` is false the final pair (the return to start) is left
    /// untouched.
    pub fn deposit(&mut self, route: &[usize], amount: f64, include_closing_edge: bool) -> ColonyResult<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ColonyError::invalid(format!(
                "deposit must be finite and positive, got {}", amount
            )));
        }
        let n = self.dimension();
        if let Some(&bad) = route.iter().find(|&&s| s >= n) {
            return Err(ColonyError::invalid(format!(
                "route station {} is out of range for {} stations", bad, n
            )));
        }

        let pairs = route.len().saturating_sub(1);
        let reinforced = if include_closing_edge { pairs } else { pairs.saturating_sub(1) };

        for w in route.windows(2).take(reinforced) {
            self.strength[w[0]][w[1]] += amount;
        }
        Ok(())
    }

    /// Smallest entry; useful to check the nonnegativity invariant.
    pub fn min_entry(&self) -> f64 {
        self.strength
            .iter()
            .flat_map(|row| row.iter().cloned())
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_matrix() {
        let t = TrailMatrix::new(3, 1.0);
        assert_eq!(t.dimension(), 3);
        assert!(t.rows().iter().all(|r| r.iter().all(|&v| v == 1.0)));
    }

    #[test]
    fn test_deposit_is_directional() {
        let mut t = TrailMatrix::new(3, 1.0);
        t.deposit(&[0, 1, 2, 0], 0.25, true).unwrap();

        assert_eq!(t.get(0, 1), 1.25);
        assert_eq!(t.get(1, 2), 1.25);
        assert_eq!(t.get(2, 0), 1.25);
        // reverse directions untouched
        assert_eq!(t.get(1, 0), 1.0);
        assert_eq!(t.get(2, 1), 1.0);
        assert_eq!(t.get(0, 2), 1.0);
    }

    #[test]
    fn test_deposit_without_closing_edge() {
        let mut t = TrailMatrix::new(3, 1.0);
        t.deposit(&[0, 1, 2, 0], 0.5, false).unwrap();
        assert_eq!(t.get(0, 1), 1.5);
        assert_eq!(t.get(1, 2), 1.5);
        assert_eq!(t.get(2, 0), 1.0);
    }

    #[test]
    fn test_evaporate() {
        let mut t = TrailMatrix::new(2, 1.0);
        t.deposit(&[0, 1, 0], 1.0, true).unwrap();
        t.evaporate(0.5).unwrap();
        assert_eq!(t.get(0, 1), 1.0);
        assert_eq!(t.get(0, 0), 0.5);
        assert!(t.evaporate(0.0).is_err());
        assert!(t.evaporate(1.5).is_err());
    }

    #[test]
    fn test_rejects_bad_deposits() {
        let mut t = TrailMatrix::new(2, 1.0);
        assert!(t.deposit(&[0, 1, 0], f64::INFINITY, true).is_err());
        assert!(t.deposit(&[0, 1, 0], 0.0, true).is_err());
        assert!(t.deposit(&[0, 5, 0], 1.0, true).is_err());
        assert_eq!(t, TrailMatrix::new(2, 1.0));
        assert!(t.min_entry() >= 0.0);
    }
}
