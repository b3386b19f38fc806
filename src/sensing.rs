//! Measurement update: re-weight a belief by how well each cell explains
//! a noisy four-direction proximity reading.
//!
//! For every open cell the likelihood of the observation is the product of
//! four independent per-direction terms. Each term compares the reading for
//! that direction with the true state of the neighbor there; off-grid
//! neighbors count as obstacles. The posterior is the prior times that
//! likelihood, normalized so the open cells sum to 100.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::belief::{round_percent, Belief, BeliefCell};
use crate::error::{LocalizationError, Result};
use crate::grid::{Grid, Neighbor};
use crate::heading::Heading;

/// Obstacle readings in the four compass directions; `true` means "sensed obstacle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[u8; 4]", into = "[u8; 4]")]
pub struct Observation {
    pub west: bool,
    pub north: bool,
    pub east: bool,
    pub south: bool,
}

impl Observation {
    pub fn new(west: bool, north: bool, east: bool, south: bool) -> Self {
        Self { west, north, east, south }
    }

    /// The reading taken towards `heading`.
    pub fn reading(&self, heading: Heading) -> bool {
        match heading {
            Heading::West => self.west,
            Heading::North => self.north,
            Heading::East => self.east,
            Heading::South => self.south,
        }
    }

    /// The reading a noiseless sensor would return at an open cell.
    pub fn exact(grid: &Grid, row: usize, col: usize) -> Self {
        let blocked = |h| grid.neighbor(row, col, h) == Neighbor::Blocked;
        Self::new(
            blocked(Heading::West),
            blocked(Heading::North),
            blocked(Heading::East),
            blocked(Heading::South),
        )
    }
}

impl TryFrom<[u8; 4]> for Observation {
    type Error = LocalizationError;

    fn try_from(bits: [u8; 4]) -> Result<Self> {
        let bit = |b: u8| match b {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(LocalizationError::InvalidObservation(format!("{bits:?}"))),
        };
        Ok(Self::new(bit(bits[0])?, bit(bits[1])?, bit(bits[2])?, bit(bits[3])?))
    }
}

impl From<Observation> for [u8; 4] {
    fn from(obs: Observation) -> Self {
        [obs.west as u8, obs.north as u8, obs.east as u8, obs.south as u8]
    }
}

/// Accepts `"0100"`, `"0,1,0,0"` or `"0 1 0 0"` in west, north, east, south order.
impl FromStr for Observation {
    type Err = LocalizationError;

    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<char> = s.chars().filter(|c| !c.is_whitespace() && *c != ',').collect();
        if digits.len() != 4 {
            return Err(LocalizationError::InvalidObservation(s.to_string()));
        }
        let mut bits = [0u8; 4];
        for (bit, c) in bits.iter_mut().zip(&digits) {
            *bit = match *c {
                '0' => 0,
                '1' => 1,
                _ => return Err(LocalizationError::InvalidObservation(s.to_string())),
            };
        }
        Self::try_from(bits)
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: [u8; 4] = (*self).into();
        write!(f, "{}{}{}{}", bits[0], bits[1], bits[2], bits[3])
    }
}

/// Asymmetric proximity sensor noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModel {
    /// P(sense open | neighbor open). Typical: 0.95
    pub open_hit: f64,
    /// P(sense obstacle | neighbor blocked). Typical: 0.9
    pub obstacle_hit: f64,
}

impl Default for SensorModel {
    fn default() -> Self {
        Self {
            open_hit: 0.95,
            obstacle_hit: 0.9,
        }
    }
}

impl SensorModel {
    /// A noiseless sensor.
    pub fn perfect() -> Self {
        Self {
            open_hit: 1.0,
            obstacle_hit: 1.0,
        }
    }

    /// Both hit rates must be probabilities.
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [("open_hit", self.open_hit), ("obstacle_hit", self.obstacle_hit)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(LocalizationError::Config(format!("sensor {name} {p} outside [0, 1]")));
            }
        }
        Ok(())
    }

    /// P(reading | true neighbor state) for one direction.
    pub fn reading_likelihood(&self, blocked: bool, sensed_obstacle: bool) -> f64 {
        match (blocked, sensed_obstacle) {
            (true, true) => self.obstacle_hit,
            (true, false) => 1.0 - self.obstacle_hit,
            (false, false) => self.open_hit,
            (false, true) => 1.0 - self.open_hit,
        }
    }

    /// P(observation | robot at `(row, col)`), assuming independent directions.
    pub fn likelihood(&self, grid: &Grid, row: usize, col: usize, obs: &Observation) -> f64 {
        Heading::ALL.iter().fold(1.0, |acc, &heading| {
            let blocked = grid.neighbor(row, col, heading) == Neighbor::Blocked;
            acc * self.reading_likelihood(blocked, obs.reading(heading))
        })
    }
}

/// Posterior belief after observing `obs`, in percent rounded to two decimals.
///
/// Fails with [`LocalizationError::DegenerateBelief`] when no open cell can
/// explain the observation under `prior`.
pub fn sense(grid: &Grid, prior: &Belief, obs: &Observation, model: &SensorModel) -> Result<Belief> {
    prior.check_against(grid)?;

    // Priors are scaled into [0, 1] so the normalizer cannot overflow.
    let scale = prior.iter_open().map(|(_, _, w)| w).fold(0.0, f64::max);
    if scale <= 0.0 {
        tracing::warn!(%obs, "prior carries no mass");
        return Err(LocalizationError::DegenerateBelief { normalizer: 0.0 });
    }

    let cols = grid.cols();
    let unnormalized: Vec<f64> = (0..grid.rows() * cols)
        .into_par_iter()
        .map(|k| {
            let (i, j) = (k / cols, k % cols);
            match prior.get(i, j) {
                BeliefCell::Open(w) => model.likelihood(grid, i, j, obs) * (w / scale),
                BeliefCell::Obstacle => 0.0,
            }
        })
        .collect();

    // Summed in order so repeated calls are bit-identical.
    let normalizer: f64 = unnormalized.iter().sum();
    if !normalizer.is_finite() || normalizer <= 0.0 {
        tracing::warn!(%obs, normalizer, "observation impossible under prior");
        return Err(LocalizationError::DegenerateBelief { normalizer });
    }
    tracing::debug!(%obs, normalizer, scale, "sensing update");

    let posterior: Vec<f64> = unnormalized
        .iter()
        .map(|w| round_percent(w / normalizer * 100.0))
        .collect();
    Ok(Belief::from_row_major(grid, &posterior))
}
