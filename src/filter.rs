//! Recursive grid Bayes filter: alternate sensing and motion updates,
//! each consuming the previous posterior as its prior.

use serde::{Deserialize, Serialize};

use crate::belief::Belief;
use crate::error::Result;
use crate::grid::Grid;
use crate::heading::Heading;
use crate::motion::{predict, MotionModel};
use crate::sensing::{sense, Observation, SensorModel};

/// One sense or move step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Sense(Observation),
    Move(Heading),
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Sense(obs) => write!(f, "sense {obs}"),
            Action::Move(heading) => write!(f, "move {heading}"),
        }
    }
}

/// Belief after a single applied action.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub action: Action,
    pub belief: Belief,
}

/// Grid localization filter holding the current belief.
#[derive(Debug, Clone)]
pub struct GridBayesFilter {
    grid: Grid,
    sensor: SensorModel,
    motion: MotionModel,
    belief: Belief,
}

impl GridBayesFilter {
    /// Start from a uniform belief over the open cells.
    pub fn new(grid: Grid, sensor: SensorModel, motion: MotionModel) -> Self {
        let belief = Belief::uniform(&grid);
        Self { grid, sensor, motion, belief }
    }

    /// Start from an explicit prior, which must match the grid.
    pub fn with_prior(grid: Grid, prior: Belief, sensor: SensorModel, motion: MotionModel) -> Result<Self> {
        prior.check_against(&grid)?;
        Ok(Self { grid, sensor, motion, belief: prior })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn belief(&self) -> &Belief {
        &self.belief
    }

    /// Measurement update. On error the current belief is left as it was.
    pub fn sense(&mut self, obs: &Observation) -> Result<&Belief> {
        self.belief = sense(&self.grid, &self.belief, obs, &self.sensor)?;
        Ok(&self.belief)
    }

    /// Prediction update for one commanded move.
    pub fn predict(&mut self, heading: Heading) -> Result<&Belief> {
        self.belief = predict(&self.grid, &self.belief, heading, &self.motion)?;
        Ok(&self.belief)
    }

    pub fn apply(&mut self, action: Action) -> Result<&Belief> {
        match action {
            Action::Sense(obs) => self.sense(&obs),
            Action::Move(heading) => self.predict(heading),
        }
    }

    /// Apply `actions` in order, recording the belief after each.
    ///
    /// Stops at the first failing step and returns its error.
    pub fn run(&mut self, actions: &[Action]) -> Result<Vec<StepRecord>> {
        let mut records = Vec::with_capacity(actions.len());
        for (step, &action) in actions.iter().enumerate() {
            let belief = self.apply(action)?.clone();
            if let Some((row, col, p)) = belief.most_likely() {
                tracing::info!(step, %action, row, col, p, "belief updated");
            }
            records.push(StepRecord { action, belief });
        }
        Ok(records)
    }
}
