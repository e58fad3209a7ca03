//! Island simulation engine.
//!
//! Animals live in the cells of an island grid; every simulated year the
//! island runs feeding, procreation, migration, aging and death over all
//! cells in a fixed order.

pub mod animal;
pub mod cell;
pub mod count_log;
pub mod island;
pub mod rng;
pub mod simulation;

pub use animal::Animal;
pub use cell::Cell;
pub use count_log::CountLog;
pub use island::{Distributions, Island};
pub use rng::{RandomSource, SimRng};

/// Replays queued draws; only for tests
#[doc(hidden)]
pub use rng::ScriptedSource;
pub use simulation::BioSim;
