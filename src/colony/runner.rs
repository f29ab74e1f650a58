//! Sequential colony run.
//!
//! Ants run strictly one after another. Before each ant the evaporation schedule
//! may scale the trail matrix; the ant then builds its tour against the current
//! matrix, and its deposit is added along the directed edges it travelled. Every
//! ant therefore sees the cumulative effect of all earlier ants.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::colony::evaporation::{EvaporationPolicy, EvaporationSchedule};
use crate::colony::selection::{ProbabilitySelector, SelectionExponents};
use crate::colony::tour::TourBuilder;
use crate::colony::trail::TrailMatrix;
use crate::error::{ColonyError, ColonyResult};
use crate::instance::DistanceMatrix;
use crate::solution::AntResult;

/// Colony configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Number of ants
    pub num_ants: usize,
    /// Exponent p applied to inverse-distance desirability
    pub desirability_exponent: f64,
    /// Exponent q applied to trail strength
    pub trail_exponent: f64,
    /// Value of every trail entry at the start of a run
    pub initial_trail: f64,
    /// Which ants trigger evaporation, and by how much
    pub evaporation: EvaporationPolicy,
    /// Reinforce the return edge back to the start station
    pub reinforce_closing_edge: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        ColonyConfig {
            num_ants: 2,
            desirability_exponent: 2.0,
            trail_exponent: 1.0,
            initial_trail: 1.0,
            evaporation: EvaporationPolicy::default(),
            reinforce_closing_edge: true,
            seed: 42,
        }
    }
}

impl ColonyConfig {
    pub fn exponents(&self) -> SelectionExponents {
        SelectionExponents {
            desirability: self.desirability_exponent,
            trail: self.trail_exponent,
        }
    }

    pub fn validate(&self) -> ColonyResult<()> {
        if self.num_ants == 0 {
            return Err(ColonyError::invalid("at least one ant is required"));
        }
        if !self.initial_trail.is_finite() || self.initial_trail <= 0.0 {
            return Err(ColonyError::invalid(format!(
                "initial trail must be finite and positive, got {}", self.initial_trail
            )));
        }
        self.exponents().validate()?;
        self.evaporation.validate()
    }
}

/// What happened to an ant's deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AntOutcome {
    /// The ant's deposit was added to the trail matrix.
    Deposited(AntResult),
    /// The route had no finite deposit; the trail matrix was not reinforced.
    DepositSkipped { route: Vec<usize>, reason: String },
}

impl AntOutcome {
    pub fn result(&self) -> Option<&AntResult> {
        match self {
            AntOutcome::Deposited(result) => Some(result),
            AntOutcome::DepositSkipped { .. } => None,
        }
    }

    pub fn route(&self) -> &[usize] {
        match self {
            AntOutcome::Deposited(result) => &result.route,
            AntOutcome::DepositSkipped { route, .. } => route,
        }
    }
}

/// One ant's contribution to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntStep {
    /// 0-based position in the ant sequence
    pub ant: usize,
    /// Decay factor applied before this ant, if any
    pub evaporated: Option<f64>,
    pub outcome: AntOutcome,
    /// Trail matrix after this ant's update
    pub trail: TrailMatrix,
}

/// Every step of a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyRun {
    pub start: usize,
    pub config: ColonyConfig,
    /// Label of the evaporation schedule that actually ran
    pub schedule: String,
    pub steps: Vec<AntStep>,
}

impl ColonyRun {
    /// Trail matrix after the last ant.
    pub fn final_trail(&self) -> Option<&TrailMatrix> {
        self.steps.last().map(|s| &s.trail)
    }

    /// Results of the ants whose deposit was applied.
    pub fn results(&self) -> impl Iterator<Item = &AntResult> {
        self.steps.iter().filter_map(|s| s.outcome.result())
    }

    pub fn skipped(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.result().is_none()).count()
    }
}

/// Owns the trail matrix for the duration of a run.
pub struct ColonyRunner<'a, S: EvaporationSchedule = EvaporationPolicy> {
    distances: &'a DistanceMatrix,
    start: usize,
    config: ColonyConfig,
    schedule: S,
    trail: TrailMatrix,
}

impl<'a> ColonyRunner<'a, EvaporationPolicy> {
    /// Runner using the evaporation policy from `config`.
    pub fn new(distances: &'a DistanceMatrix, start: usize, config: ColonyConfig) -> ColonyResult<Self> {
        let schedule = config.evaporation;
        Self::with_schedule(distances, start, config, schedule)
    }
}

impl<'a, S: EvaporationSchedule> ColonyRunner<'a, S> {
    /// Runner with a caller-supplied evaporation schedule; `config.evaporation` is
    /// ignored and runs record the schedule's own label.
    pub fn with_schedule(
        distances: &'a DistanceMatrix,
        start: usize,
        config: ColonyConfig,
        schedule: S,
    ) -> ColonyResult<Self> {
        config.validate()?;
        let n = distances.dimension();
        if start >= n {
            return Err(ColonyError::invalid(format!(
                "start station {} is out of range for {} stations", start, n
            )));
        }

        let trail = TrailMatrix::new(n, config.initial_trail);
        Ok(ColonyRunner { distances, start, config, schedule, trail })
    }

    pub fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Current trail matrix.
    pub fn trail(&self) -> &TrailMatrix {
        &self.trail
    }

    /// Run the colony with a generator seeded from `config.seed`.
    pub fn run(&mut self) -> ColonyResult<ColonyRun> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.run_with_rng(&mut rng)
    }

    pub fn run_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ColonyResult<ColonyRun> {
        self.run_observed(rng, |_| {})
    }

    /// Run every ant, calling `on_step` after each one. The trail matrix is reset to
    /// its initial value first.
    pub fn run_observed<R, F>(&mut self, rng: &mut R, mut on_step: F) -> ColonyResult<ColonyRun>
    where
        R: Rng + ?Sized,
        F: FnMut(&AntStep),
    {
        self.trail = TrailMatrix::new(self.distances.dimension(), self.config.initial_trail);

        let mut steps = Vec::with_capacity(self.config.num_ants);
        for ant in 0..self.config.num_ants {
            let step = self.step(ant, rng)?;
            on_step(&step);
            steps.push(step);
        }

        Ok(ColonyRun {
            start: self.start,
            config: self.config.clone(),
            schedule: self.schedule.label(),
            steps,
        })
    }

    /// Evaporate (per schedule), build one tour, deposit.
    fn step<R: Rng + ?Sized>(&mut self, ant: usize, rng: &mut R) -> ColonyResult<AntStep> {
        let evaporated = self.schedule.decay_for(ant, self.config.num_ants);
        if let Some(factor) = evaporated {
            self.trail.evaporate(factor)?;
        }

        let builder = TourBuilder::new(self.distances, ProbabilitySelector::new(self.config.exponents()));
        let outcome = match builder.build(self.start, &self.trail, rng) {
            Ok(result) => {
                self.trail.deposit(&result.route, result.deposit, self.config.reinforce_closing_edge)?;
                log::info!(
                    "ant {} route {:?} distance {:.4} deposit {:.6}{}",
                    ant + 1,
                    result.route,
                    result.total_distance,
                    result.deposit,
                    if result.status.is_complete() { "" } else { " (partial)" }
                );
                AntOutcome::Deposited(result)
            }
            Err(ColonyError::ZeroTotalDistance { route }) => {
                log::warn!("ant {}: route {:?} has zero total distance; deposit skipped", ant + 1, route);
                AntOutcome::DepositSkipped {
                    route,
                    reason: "zero total distance".to_string(),
                }
            }
            Err(e) => return Err(e),
        };

        Ok(AntStep {
            ant,
            evaporated,
            outcome,
            trail: self.trail.clone(),
        })
    }
}
