//! Roulette-wheel selection of the next station.
//!
//! The weight of an unvisited station `j` seen from `current` is
//! `eta(current, j)^p * tau(current, j)^q`, where `eta` is the inverse-distance
//! desirability and `tau` the trail strength. Both factors are divided by their
//! largest value among the candidates before the exponents are applied, which
//! changes no probability but keeps extreme distance or trail scales from
//! overflowing. Weights are normalized into a
//! cumulative distribution over station indices in ascending order, and a uniform
//! draw `r` in [0, 1) picks the first positive-weight station whose cumulative value
//! reaches `r`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::colony::efficiency::relative_desirability;
use crate::colony::trail::TrailMatrix;
use crate::error::{ColonyError, ColonyResult};
use crate::instance::DistanceMatrix;

/// Exponents applied to desirability (p) and trail strength (q).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionExponents {
    pub desirability: f64,
    pub trail: f64,
}

impl Default for SelectionExponents {
    fn default() -> Self {
        SelectionExponents { desirability: 2.0, trail: 1.0 }
    }
}

impl SelectionExponents {
    pub fn validate(&self) -> ColonyResult<()> {
        for (name, value) in [("desirability", self.desirability), ("trail", self.trail)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ColonyError::invalid(format!(
                    "{} exponent must be finite and nonnegative, got {}", name, value
                )));
            }
        }
        Ok(())
    }
}

/// Normalized selection distribution from one station. Only constructed when at
/// least one candidate has positive weight.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDistribution {
    weights: Vec<f64>,
    probabilities: Vec<f64>,
    cumulative: Vec<f64>,
}

impl SelectionDistribution {
    /// Combined weights relative to the strongest candidate; visited stations are 0.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    /// Pick a station for the uniform draw `r` in [0, 1).
    pub fn sample(&self, r: f64) -> usize {
        let mut last_candidate = 0;
        for (i, (&w, &c)) in self.weights.iter().zip(self.cumulative.iter()).enumerate() {
            if w <= 0.0 {
                continue;
            }
            if c >= r {
                return i;
            }
            last_candidate = i;
        }
        // rounding can leave the final cumulative value a hair under r
        last_candidate
    }
}

/// Combines desirability and trail strength into a distribution and samples it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbabilitySelector {
    exponents: SelectionExponents,
}

impl ProbabilitySelector {
    pub fn new(exponents: SelectionExponents) -> Self {
        ProbabilitySelector { exponents }
    }

    pub fn exponents(&self) -> SelectionExponents {
        self.exponents
    }

    /// Distribution over the stations not marked in `visited`, or
    /// `NoFeasibleSuccessor` if every one of them has zero weight.
    pub fn distribution(
        &self,
        current: usize,
        trail: &TrailMatrix,
        distances: &DistanceMatrix,
        visited: &[bool],
    ) -> ColonyResult<SelectionDistribution> {
        let candidates: Vec<bool> = visited.iter().map(|&v| !v).collect();
        // both factors are taken relative to the row's strongest candidate so that
        // powf stays in range whatever the distance or trail scale
        let eta = relative_desirability(current, distances, &candidates);
        let strongest_trail = (0..eta.len())
            .filter(|&j| eta[j] > 0.0)
            .map(|j| trail.get(current, j))
            .fold(0.0, f64::max);

        let weights: Vec<f64> = eta
            .iter()
            .enumerate()
            .map(|(j, &e)| {
                // 0^0 is 1 under powf; a zero desirability must stay unselectable
                if e <= 0.0 {
                    0.0
                } else {
                    let tau = if strongest_trail > 0.0 {
                        trail.get(current, j) / strongest_trail
                    } else {
                        0.0
                    };
                    e.powf(self.exponents.desirability) * tau.powf(self.exponents.trail)
                }
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(ColonyError::NoFeasibleSuccessor {
                from: current,
                visited: visited
                    .iter()
                    .enumerate()
                    .filter(|&(_, &v)| v)
                    .map(|(i, _)| i)
                    .collect(),
            });
        }

        let probabilities: Vec<f64> = weights.iter().map(|w| w / total).collect();
        let cumulative: Vec<f64> = probabilities
            .iter()
            .scan(0.0, |acc, p| {
                *acc += p;
                Some(*acc)
            })
            .collect();

        Ok(SelectionDistribution { weights, probabilities, cumulative })
    }

    /// Draw the next station from `current`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        current: usize,
        trail: &TrailMatrix,
        distances: &DistanceMatrix,
        visited: &[bool],
        rng: &mut R,
    ) -> ColonyResult<usize> {
        let dist = self.distribution(current, trail, distances, visited)?;
        let r: f64 = rng.gen();
        let next = dist.sample(r);
        log::debug!("from {} drew r={:.4} -> {} (p={:.4})", current, r, next, dist.probabilities[next]);
        Ok(next)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::RngCore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Replays fixed uniform draws through `Rng::gen::<f64>()`.
    pub(crate) struct ScriptedRng {
        draws: Vec<f64>,
        pos: usize,
    }

    impl ScriptedRng {
        pub(crate) fn new(draws: Vec<f64>) -> Self {
            ScriptedRng { draws, pos: 0 }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            // rand's f64 sampling keeps the top 53 bits
            let r = self.draws[self.pos % self.draws.len()];
            self.pos += 1;
            ((r * (1u64 << 53) as f64) as u64) << 11
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    fn line_matrix() -> DistanceMatrix {
        scaled_line_matrix(1.0)
    }

    fn scaled_line_matrix(scale: f64) -> DistanceMatrix {
        // from 0: B at 1, C at 2, D at 4
        let rows = [
            [0.0, 1.0, 2.0, 4.0],
            [1.0, 0.0, 1.0, 2.0],
            [2.0, 1.0, 0.0, 1.0],
            [4.0, 2.0, 1.0, 0.0],
        ];
        DistanceMatrix::new(rows.iter().map(|r| r.iter().map(|d| d * scale).collect()).collect())
            .unwrap()
    }

    #[test]
    fn test_distribution_values() {
        let selector = ProbabilitySelector::default();
        let trail = TrailMatrix::new(4, 1.0);
        let visited = [true, false, false, false];

        let dist = selector.distribution(0, &trail, &line_matrix(), &visited).unwrap();
        // nearest candidate scores 1: weights 1, 1/4, 1/16 -> total 21/16
        assert_eq!(dist.weights(), &[0.0, 1.0, 0.25, 0.0625]);
        assert!((dist.probabilities()[1] - 16.0 / 21.0).abs() < 1e-12);
        assert!((dist.cumulative()[3] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_trail_exponent_changes_weights() {
        let selector = ProbabilitySelector::new(SelectionExponents { desirability: 2.0, trail: 2.0 });
        let mut trail = TrailMatrix::new(4, 1.0);
        trail.deposit(&[0, 3], 2.0, true).unwrap();

        let dist = selector
            .distribution(0, &trail, &line_matrix(), &[true, false, false, false])
            .unwrap();
        // D against B: (1/16) * 3^2 over 1 * 1^2
        let w = dist.weights();
        assert!((w[3] / w[1] - 9.0 / 16.0).abs() < 1e-12);
        assert!((dist.probabilities()[3] - 9.0 / 29.0).abs() < 1e-12);
    }

    #[test]
    fn test_distribution_ignores_scale() {
        let selector = ProbabilitySelector::new(SelectionExponents { desirability: 2.0, trail: 2.0 });
        let visited = [true, false, false, false];
        let reference = selector
            .distribution(0, &TrailMatrix::new(4, 1.0), &line_matrix(), &visited)
            .unwrap();

        for (d_scale, t_scale) in [(1e-200, 1.0), (1e200, 1.0), (1.0, 1e200), (1e-250, 1e-250)] {
            let m = scaled_line_matrix(d_scale);
            let dist = selector
                .distribution(0, &TrailMatrix::new(4, t_scale), &m, &visited)
                .unwrap();
            for (a, b) in dist.probabilities().iter().zip(reference.probabilities()) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_sample_scans_in_index_order() {
        let selector = ProbabilitySelector::default();
        let trail = TrailMatrix::new(4, 1.0);
        let visited = [true, false, false, false];
        let m = line_matrix();

        let mut rng = ScriptedRng::new(vec![0.0, 0.5, 0.8, 0.99]);
        let picks: Vec<usize> = (0..4)
            .map(|_| selector.select(0, &trail, &m, &visited, &mut rng).unwrap())
            .collect();
        // cumulative: B 0.762, C 0.952, D 1.0
        assert_eq!(picks, vec![1, 1, 2, 3]);
    }

    #[test]
    fn test_visited_stations_never_selected() {
        let selector = ProbabilitySelector::default();
        let trail = TrailMatrix::new(4, 1.0);
        let visited = [true, true, false, true];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..100 {
            assert_eq!(selector.select(0, &trail, &line_matrix(), &visited, &mut rng).unwrap(), 2);
        }
    }

    #[test]
    fn test_zero_distance_edge_not_selected() {
        let m = DistanceMatrix::new(vec![
            vec![0.0, 0.0, 3.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]).unwrap();
        let selector = ProbabilitySelector::new(SelectionExponents { desirability: 0.0, trail: 1.0 });
        let trail = TrailMatrix::new(3, 1.0);
        let mut rng = ScriptedRng::new(vec![0.0]);

        assert_eq!(selector.select(0, &trail, &m, &[true, false, false], &mut rng).unwrap(), 2);
    }

    #[test]
    fn test_degenerate_distribution() {
        let m = DistanceMatrix::new(vec![
            vec![0.0, 0.0, 0.0],
            vec![1.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ]).unwrap();
        let selector = ProbabilitySelector::default();
        let trail = TrailMatrix::new(3, 1.0);

        match selector.distribution(0, &trail, &m, &[true, false, false]) {
            Err(ColonyError::NoFeasibleSuccessor { from, visited }) => {
                assert_eq!(from, 0);
                assert_eq!(visited, vec![0]);
            }
            other => panic!("expected NoFeasibleSuccessor, got {:?}", other),
        }
    }

    #[test]
    fn test_exponent_validation() {
        assert!(SelectionExponents::default().validate().is_ok());
        assert!(SelectionExponents { desirability: -1.0, trail: 1.0 }.validate().is_err());
        assert!(SelectionExponents { desirability: 2.0, trail: f64::NAN }.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_distribution_sums_to_one(
            rows in prop::collection::vec(prop::collection::vec(0.1_f64..100.0, 6), 6),
            visited_mask in prop::collection::vec(any::<bool>(), 6),
            r in 0.0_f64..1.0,
        ) {
            let m = DistanceMatrix::new(rows).unwrap();
            let mut visited = visited_mask.clone();
            visited[0] = true;
            prop_assume!(visited.iter().any(|v| !v));

            let trail = TrailMatrix::new(6, 1.0);
            let dist = ProbabilitySelector::default().distribution(0, &trail, &m, &visited).unwrap();

            let sum: f64 = dist.probabilities().iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9);

            let picked = dist.sample(r);
            prop_assert!(!visited[picked]);
        }
    }
}
