//! Ant Route Simulator Library
//!
//! Simulates stigmergic route construction over a small complete graph of
//! labelled stations. A fixed number of ants run one after another; each builds a
//! closed tour by roulette-wheel selection biased by inverse distance and by a
//! shared trail matrix, then reinforces the directed edges it travelled.
//!
//! # Features
//!
//! - Asymmetric distance matrices, zero entries marking undesirable edges
//! - Configurable desirability/trail exponents
//! - Pluggable evaporation schedules
//! - Explicit partial-tour and skipped-deposit outcomes
//! - Seeded, reproducible runs
//! - Text, CSV and JSON reporting
//!
//! # Example
//!
//! ```no_run
//! use ant_route_sim::instance::ColonyInstance;
//! use ant_route_sim::colony::{ColonyConfig, ColonyRunner};
//! use ant_route_sim::report::RunReport;
//!
//! let instance = ColonyInstance::from_file("stations.txt").unwrap();
//! let config = ColonyConfig { num_ants: 5, ..Default::default() };
//!
//! let mut runner = ColonyRunner::new(&instance.distances, 0, config).unwrap();
//! let run = runner.run().unwrap();
//!
//! let report = RunReport::new(&instance, &run);
//! println!("{}", report.render_text(false));
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod colony;
pub mod report;

pub use error::{ColonyError, ColonyResult};
pub use instance::{ColonyInstance, DistanceMatrix};
pub use solution::{AntResult, TourStatus};
