use grid_localization::{
    predict, sense, Belief, BeliefCell, Grid, Heading, MotionModel, Observation, SensorModel,
};
use proptest::prelude::*;

type Layout = (Vec<Vec<u8>>, Vec<Vec<f64>>);

fn grid_and_weights() -> impl Strategy<Value = Layout> {
    (1usize..6, 1usize..6)
        .prop_flat_map(|(rows, cols)| {
            (
                prop::collection::vec(prop::collection::vec(0u8..2, cols), rows),
                prop::collection::vec(prop::collection::vec(0.01f64..10.0, cols), rows),
            )
        })
        .prop_filter("needs an open cell", |(grid, _)| grid.iter().flatten().any(|&v| v == 0))
}

fn observation() -> impl Strategy<Value = Observation> {
    (0u8..16).prop_map(|b| {
        Observation::try_from([b & 1, (b >> 1) & 1, (b >> 2) & 1, (b >> 3) & 1]).unwrap()
    })
}

fn heading() -> impl Strategy<Value = Heading> {
    prop::sample::select(Heading::ALL.to_vec())
}

fn build((cells, weights): &Layout) -> (Grid, Belief) {
    let grid = Grid::from_rows(cells).unwrap();
    let weights: Vec<Vec<Option<f64>>> =
        weights.iter().map(|row| row.iter().copied().map(Some).collect()).collect();
    let belief = Belief::from_weights(&grid, &weights).unwrap();
    (grid, belief)
}

/// Surround the layout with a ring of obstacle cells.
fn walled(layout: &Layout) -> Layout {
    let cols = layout.0[0].len() + 2;
    let mut cells = vec![vec![1u8; cols]];
    let mut weights = vec![vec![1.0; cols]];
    for (row, w) in layout.0.iter().zip(&layout.1) {
        cells.push([vec![1], row.clone(), vec![1]].concat());
        weights.push([vec![1.0], w.clone(), vec![1.0]].concat());
    }
    cells.push(vec![1u8; cols]);
    weights.push(vec![1.0; cols]);
    (cells, weights)
}

fn assert_same_interior(inner: &Belief, outer: &Belief) -> Result<(), TestCaseError> {
    for i in 0..inner.rows() {
        for j in 0..inner.cols() {
            match (inner.get(i, j), outer.get(i + 1, j + 1)) {
                (BeliefCell::Open(a), BeliefCell::Open(b)) => prop_assert!((a - b).abs() < 1e-9),
                (BeliefCell::Obstacle, BeliefCell::Obstacle) => {}
                other => prop_assert!(false, "layout differs at ({i}, {j}): {other:?}"),
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn sensing_normalizes_to_hundred(layout in grid_and_weights(), obs in observation()) {
        let (grid, prior) = build(&layout);
        let posterior = sense(&grid, &prior, &obs, &SensorModel::default()).unwrap();
        let slack = 0.005 * grid.open_count() as f64 + 1e-9;
        prop_assert!((posterior.total() - 100.0).abs() <= slack);
    }

    #[test]
    fn obstacles_stay_marked(layout in grid_and_weights(), obs in observation(), h in heading()) {
        let (grid, prior) = build(&layout);
        let sensed = sense(&grid, &prior, &obs, &SensorModel::default()).unwrap();
        let moved = predict(&grid, &sensed, h, &MotionModel::default()).unwrap();
        for i in 0..grid.rows() {
            for j in 0..grid.cols() {
                let obstacle = !grid.is_open(i, j);
                prop_assert_eq!(sensed.get(i, j) == BeliefCell::Obstacle, obstacle);
                prop_assert_eq!(moved.get(i, j) == BeliefCell::Obstacle, obstacle);
            }
        }
    }

    #[test]
    fn updates_are_deterministic(layout in grid_and_weights(), obs in observation(), h in heading()) {
        let (grid, prior) = build(&layout);
        let model = SensorModel::default();
        prop_assert_eq!(
            sense(&grid, &prior, &obs, &model).unwrap(),
            sense(&grid, &prior, &obs, &model).unwrap()
        );
        let motion = MotionModel::default();
        prop_assert_eq!(
            predict(&grid, &prior, h, &motion).unwrap(),
            predict(&grid, &prior, h, &motion).unwrap()
        );
    }

    #[test]
    fn motion_conserves_mass(layout in grid_and_weights(), h in heading()) {
        let (grid, prior) = build(&layout);
        let moved = predict(&grid, &prior, h, &MotionModel::default()).unwrap();
        let slack = 0.005 * grid.open_count() as f64 + 1e-9 * prior.total().max(1.0);
        prop_assert!((moved.total() - prior.total()).abs() <= slack);
    }

    #[test]
    fn grid_edge_acts_like_obstacle_ring(
        layout in grid_and_weights(),
        obs in observation(),
        h in heading()
    ) {
        let (grid, prior) = build(&layout);
        let (outer_grid, outer_prior) = build(&walled(&layout));

        let sensed = sense(&grid, &prior, &obs, &SensorModel::default()).unwrap();
        let outer_sensed = sense(&outer_grid, &outer_prior, &obs, &SensorModel::default()).unwrap();
        assert_same_interior(&sensed, &outer_sensed)?;

        let moved = predict(&grid, &prior, h, &MotionModel::default()).unwrap();
        let outer_moved = predict(&outer_grid, &outer_prior, h, &MotionModel::default()).unwrap();
        assert_same_interior(&moved, &outer_moved)?;
    }
}
