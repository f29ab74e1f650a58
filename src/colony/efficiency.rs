//! Inverse-distance desirability.

use crate::instance::DistanceMatrix;

/// Desirability of every destination from `current`: `1 / d(current, j)` for
/// `j != current` with a positive distance, `0` otherwise.
pub fn desirability(current: usize, distances: &DistanceMatrix) -> Vec<f64> {
    distances
        .row(current)
        .iter()
        .enumerate()
        .map(|(j, &d)| if j != current && d > 0.0 { 1.0 / d } else { 0.0 })
        .collect()
}

/// Desirability over the `candidates` of `current`, scaled so the nearest one
/// scores 1: `d_min / d(current, j)`. Proportional to [`desirability`] on the
/// candidates, but stays finite for any finite positive distances.
pub fn relative_desirability(
    current: usize,
    distances: &DistanceMatrix,
    candidates: &[bool],
) -> Vec<f64> {
    let row = distances.row(current);
    let feasible = |j: usize| candidates[j] && j != current && row[j] > 0.0;
    let nearest = (0..row.len())
        .filter(|&j| feasible(j))
        .map(|j| row[j])
        .fold(f64::INFINITY, f64::min);

    (0..row.len())
        .map(|j| if feasible(j) { nearest / row[j] } else { 0.0 })
        .collect()
}
