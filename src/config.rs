//! Scenario configuration: grid, prior, noise models and the action sequence.
//!
//! Scenarios are JSON documents:
//!
//! ```json
//! {
//!   "grid": [[0, 0], [1, 0]],
//!   "prior": [[2.5, null], [null, 2.5]],
//!   "sensor": { "open_hit": 0.95, "obstacle_hit": 0.9 },
//!   "motion": { "forward": 0.75, "left_drift": 0.15, "right_drift": 0.1 },
//!   "actions": [{ "sense": [0, 1, 0, 0] }, { "move": "E" }]
//! }
//! ```
//!
//! `prior`, `sensor` and `motion` are optional; a missing prior means uniform.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::belief::Belief;
use crate::error::Result;
use crate::filter::{Action, GridBayesFilter};
use crate::grid::Grid;
use crate::heading::Heading;
use crate::motion::MotionModel;
use crate::sensing::{Observation, SensorModel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Occupancy rows, `0` open and `1` obstacle.
    pub grid: Vec<Vec<u8>>,
    /// Prior weights per cell; obstacle entries may be `null`.
    #[serde(default)]
    pub prior: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    pub sensor: SensorModel,
    #[serde(default)]
    pub motion: MotionModel,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Scenario {
    /// The 7x7 maze with a flat 2.5 prior, one sensing step `0100` and one move east.
    pub fn reference() -> Self {
        let grid = Grid::reference();
        let grid_rows: Vec<Vec<u8>> = (0..grid.rows())
            .map(|i| (0..grid.cols()).map(|j| u8::from(!grid.is_open(i, j))).collect())
            .collect();
        let prior: Vec<Vec<Option<f64>>> = (0..grid.rows())
            .map(|i| {
                (0..grid.cols())
                    .map(|j| grid.is_open(i, j).then_some(2.5))
                    .collect()
            })
            .collect();
        Self {
            grid: grid_rows,
            prior: Some(prior),
            sensor: SensorModel::default(),
            motion: MotionModel::default(),
            actions: vec![
                Action::Sense(Observation::new(false, true, false, false)),
                Action::Move(Heading::East),
            ],
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        tracing::debug!(path = %path.as_ref().display(), "loading scenario");
        Self::from_json(&text)
    }

    /// Validate everything and build a filter positioned at the prior.
    pub fn build_filter(&self) -> Result<GridBayesFilter> {
        self.sensor.validate()?;
        self.motion.validate()?;
        let grid = Grid::from_rows(&self.grid)?;
        let prior = match &self.prior {
            Some(weights) => Belief::from_weights(&grid, weights)?,
            None => Belief::uniform(&grid),
        };
        GridBayesFilter::with_prior(grid, prior, self.sensor, self.motion)
    }
}
