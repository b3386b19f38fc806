//! Ground-truth robot that produces noisy readings and slips while moving,
//! sampled from the same sensor and motion models the filter assumes.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::error::{LocalizationError, Result};
use crate::filter::Action;
use crate::grid::{Grid, Neighbor};
use crate::heading::Heading;
use crate::motion::MotionModel;
use crate::sensing::{Observation, SensorModel};

/// A robot with a known true position, driven by a seeded RNG.
pub struct SimulatedRobot<'a> {
    grid: &'a Grid,
    sensor: SensorModel,
    motion: MotionModel,
    position: (usize, usize),
    rng: StdRng,
}

impl<'a> SimulatedRobot<'a> {
    pub fn new(
        grid: &'a Grid,
        sensor: SensorModel,
        motion: MotionModel,
        start: (usize, usize),
        seed: u64,
    ) -> Result<Self> {
        sensor.validate()?;
        motion.validate()?;
        let (row, col) = start;
        if !grid.is_valid(row as isize, col as isize) || !grid.is_open(row, col) {
            return Err(LocalizationError::Config(format!(
                "start ({row}, {col}) is not an open cell"
            )));
        }
        Ok(Self {
            grid,
            sensor,
            motion,
            position: start,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn position(&self) -> (usize, usize) {
        self.position
    }

    /// Sample a noisy reading of the four neighbors.
    pub fn observe(&mut self) -> Observation {
        let truth = Observation::exact(self.grid, self.position.0, self.position.1);
        let mut sample = |blocked: bool| {
            let p_obstacle = if blocked {
                self.sensor.obstacle_hit
            } else {
                1.0 - self.sensor.open_hit
            };
            self.rng.random_bool(p_obstacle)
        };
        Observation::new(
            sample(truth.west),
            sample(truth.north),
            sample(truth.east),
            sample(truth.south),
        )
    }

    /// Attempt one move; returns the heading actually taken.
    pub fn step(&mut self, heading: Heading) -> Heading {
        let outcomes = self.motion.outcomes(heading);
        let draw = self.rng.random::<f64>() * outcomes.iter().map(|(_, p)| p).sum::<f64>();
        let mut cum = 0.0;
        let mut taken = outcomes[outcomes.len() - 1].0;
        for &(h, p) in &outcomes {
            cum += p;
            if draw < cum {
                taken = h;
                break;
            }
        }
        if let Neighbor::Open(r, c) = self.grid.neighbor(self.position.0, self.position.1, taken) {
            self.position = (r, c);
        }
        taken
    }
}

/// Actions the filter sees plus the hidden true positions.
#[derive(Debug, Clone)]
pub struct Trace {
    pub actions: Vec<Action>,
    /// True position after each action.
    pub truth: Vec<(usize, usize)>,
}

/// Sense at `start`, then move and sense once per heading in `headings`.
pub fn simulate(
    grid: &Grid,
    sensor: SensorModel,
    motion: MotionModel,
    start: (usize, usize),
    headings: &[Heading],
    seed: u64,
) -> Result<Trace> {
    let mut robot = SimulatedRobot::new(grid, sensor, motion, start, seed)?;
    let mut trace = Trace {
        actions: Vec::with_capacity(2 * headings.len() + 1),
        truth: Vec::with_capacity(2 * headings.len() + 1),
    };
    trace.actions.push(Action::Sense(robot.observe()));
    trace.truth.push(robot.position());
    for &heading in headings {
        let taken = robot.step(heading);
        tracing::trace!(%heading, %taken, position = ?robot.position(), "robot moved");
        trace.actions.push(Action::Move(heading));
        trace.truth.push(robot.position());
        trace.actions.push(Action::Sense(robot.observe()));
        trace.truth.push(robot.position());
    }
    Ok(trace)
}
