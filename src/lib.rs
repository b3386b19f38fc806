//! Discrete Bayes filter for localizing a robot on a known occupancy grid.
//!
//! The filter alternates two updates over a [`Belief`]:
//! [`sense`] re-weights it by a noisy four-direction obstacle reading, and
//! [`predict`] pushes it through an imperfect single-step move.
//!
//! # Example
//! ```rust
//! use grid_localization::{sense, predict, Belief, Grid, Heading, MotionModel, SensorModel};
//!
//! let grid = Grid::reference();
//! let prior = Belief::uniform(&grid);
//! let sensed = sense(&grid, &prior, &"0100".parse().unwrap(), &SensorModel::default()).unwrap();
//! let moved = predict(&grid, &sensed, Heading::East, &MotionModel::default()).unwrap();
//! // Each cell is rounded to two decimals, so the total is 100 up to display rounding.
//! assert!((moved.total() - 100.0).abs() < 0.2);
//! ```

pub mod belief;
pub mod config;
pub mod error;
pub mod filter;
pub mod grid;
pub mod heading;
pub mod logging;
pub mod motion;
pub mod sensing;
pub mod simulation;
pub mod visualization;

pub use belief::{round_percent, Belief, BeliefCell, OBSTACLE_MARKER, PERCENT_DECIMALS};
pub use config::Scenario;
pub use error::{LocalizationError, Result};
pub use filter::{Action, GridBayesFilter, StepRecord};
pub use grid::{CellKind, Grid, Neighbor};
pub use heading::Heading;
pub use motion::{predict, MotionModel};
pub use sensing::{sense, Observation, SensorModel};
