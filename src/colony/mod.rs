//! Colony simulation engine.
//!
//! This module exports the desirability computation, the trail matrix, the
//! evaporation schedules, roulette-wheel selection, tour construction and the
//! sequential colony runner.

pub mod efficiency;
pub mod trail;
pub mod evaporation;
pub mod selection;
pub mod tour;
pub mod runner;

pub use efficiency::{desirability, relative_desirability};
pub use trail::TrailMatrix;
pub use evaporation::{EvaporationPolicy, EvaporationSchedule, DEFAULT_DECAY};
pub use selection::{ProbabilitySelector, SelectionDistribution, SelectionExponents};
pub use tour::TourBuilder;
pub use runner::{AntOutcome, AntStep, ColonyConfig, ColonyRun, ColonyRunner};
