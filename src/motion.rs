//! Prediction update: push a belief through one commanded move of an
//! imperfect mover.
//!
//! A commanded move succeeds with probability `forward`; otherwise the robot
//! slips sideways to its left or right. Any attempted step into an obstacle
//! or off the grid bounces back, leaving the robot where it was.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::belief::{round_percent, Belief, BeliefCell};
use crate::error::{LocalizationError, Result};
use crate::grid::{Grid, Neighbor};
use crate::heading::Heading;

/// Actuation noise of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionModel {
    /// Probability the robot moves in the commanded heading. Typical: 0.75
    pub forward: f64,
    /// Probability the robot slips to the left of the commanded heading. Typical: 0.15
    pub left_drift: f64,
    /// Probability the robot slips to the right of the commanded heading. Typical: 0.10
    pub right_drift: f64,
}

impl Default for MotionModel {
    fn default() -> Self {
        Self {
            forward: 0.75,
            left_drift: 0.15,
            right_drift: 0.10,
        }
    }
}

impl MotionModel {
    /// Actual step headings and their probabilities for a commanded `heading`.
    pub fn outcomes(&self, heading: Heading) -> [(Heading, f64); 3] {
        [
            (heading, self.forward),
            (heading.left(), self.left_drift),
            (heading.right(), self.right_drift),
        ]
    }

    /// Outcome probabilities must be non-negative and sum to one.
    pub fn validate(&self) -> Result<()> {
        let ps = [self.forward, self.left_drift, self.right_drift];
        if ps.iter().any(|p| !(0.0..=1.0).contains(p)) || (ps.iter().sum::<f64>() - 1.0).abs() > 1e-9 {
            return Err(LocalizationError::Config(format!(
                "motion probabilities {ps:?} must be in [0, 1] and sum to 1"
            )));
        }
        Ok(())
    }

    /// Predicted weight of the open cell `(row, col)` after commanding `heading`.
    ///
    /// For each outcome, mass arrives from the open cell behind the step, and
    /// the cell keeps its own mass when the step ahead of it is blocked.
    /// Terms are accumulated one at a time in outcome order.
    fn transition(&self, grid: &Grid, prior: &Belief, row: usize, col: usize, heading: Heading) -> f64 {
        let own = prior.weight(row, col).unwrap_or(0.0);
        let mut total = 0.0;
        for (step, p) in self.outcomes(heading) {
            if let Neighbor::Open(r, c) = grid.neighbor(row, col, opposite(step)) {
                total += p * prior.weight(r, c).unwrap_or(0.0);
            }
            if grid.neighbor(row, col, step) == Neighbor::Blocked {
                total += p * own;
            }
        }
        total
    }
}

fn opposite(heading: Heading) -> Heading {
    heading.left().left()
}

/// Belief after commanding a single move in `heading`, in percent rounded
/// to two decimals.
pub fn predict(grid: &Grid, prior: &Belief, heading: Heading, model: &MotionModel) -> Result<Belief> {
    prior.check_against(grid)?;

    let cols = grid.cols();
    let predicted: Vec<f64> = (0..grid.rows() * cols)
        .into_par_iter()
        .map(|k| {
            let (i, j) = (k / cols, k % cols);
            match prior.get(i, j) {
                BeliefCell::Open(_) => round_percent(model.transition(grid, prior, i, j, heading)),
                BeliefCell::Obstacle => 0.0,
            }
        })
        .collect();

    let posterior = Belief::from_row_major(grid, &predicted);
    tracing::debug!(%heading, mass = posterior.total(), "motion update");
    Ok(posterior)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> Grid {
        // Three open cells in a row, walled in by the grid edge.
        Grid::from_rows(&[vec![0, 0, 0]]).unwrap()
    }

    fn point_mass(grid: &Grid, row: usize, col: usize) -> Belief {
        Belief::from_fn(grid, |i, j| if (i, j) == (row, col) { 100.0 } else { 0.0 })
    }

    #[test]
    fn test_outcomes_sum_to_one() {
        let model = MotionModel::default();
        for heading in Heading::ALL {
            let total: f64 = model.outcomes(heading).iter().map(|(_, p)| p).sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_validate() {
        assert!(MotionModel::default().validate().is_ok());
        let lopsided = MotionModel { forward: 0.9, ..Default::default() };
        assert!(lopsided.validate().is_err());
        let negative = MotionModel { forward: 1.1, left_drift: -0.1, right_drift: 0.0 };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_move_east_in_corridor() {
        let grid = corridor();
        let prior = point_mass(&grid, 0, 0);
        let posterior = predict(&grid, &prior, Heading::East, &MotionModel::default()).unwrap();
        // Both drifts hit the edge and bounce back; the forward step succeeds.
        assert!((posterior.weight(0, 0).unwrap() - 25.0).abs() < 1e-9);
        assert!((posterior.weight(0, 1).unwrap() - 75.0).abs() < 1e-9);
        assert_eq!(posterior.weight(0, 2), Some(0.0));
    }

    #[test]
    fn test_move_into_wall_bounces_back() {
        let grid = corridor();
        let prior = point_mass(&grid, 0, 2);
        let posterior = predict(&grid, &prior, Heading::East, &MotionModel::default()).unwrap();
        assert!((posterior.weight(0, 2).unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_west_move_table() {
        // Open cell at the centre with an obstacle north and open cells elsewhere.
        let grid = Grid::from_rows(&[vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 0]]).unwrap();
        let prior = Belief::from_fn(&grid, |i, j| (i * 3 + j + 1) as f64);
        let posterior = predict(&grid, &prior, Heading::West, &MotionModel::default()).unwrap();
        let w = |i, j| prior.weight(i, j).unwrap();
        // Forward mass arrives from the east. Drifting right (north) is blocked
        // and bounces back; mass drifting north from the south cell arrives.
        // Nothing drifts south out of the obstacle above.
        let expected = 0.75 * w(1, 2) + 0.10 * w(1, 1) + 0.10 * w(2, 1);
        assert!((posterior.weight(1, 1).unwrap() - expected).abs() <= 0.005 + 1e-12);
    }

    #[test]
    fn test_mass_is_conserved() {
        let grid = Grid::reference();
        let prior = Belief::uniform(&grid);
        let model = MotionModel::default();
        for heading in Heading::ALL {
            let posterior = predict(&grid, &prior, heading, &model).unwrap();
            let slack = 0.005 * grid.open_count() as f64;
            assert!((posterior.total() - 100.0).abs() <= slack, "{heading}: {}", posterior.total());
            assert_eq!(posterior.get(3, 3), BeliefCell::Obstacle);
        }
    }

    #[test]
    fn test_predict_rejects_foreign_belief() {
        let other = Grid::from_rows(&[vec![0, 0]]).unwrap();
        let err = predict(&corridor(), &Belief::uniform(&other), Heading::North, &MotionModel::default())
            .unwrap_err();
        assert!(matches!(err, LocalizationError::DimensionMismatch { .. }));
    }
}
