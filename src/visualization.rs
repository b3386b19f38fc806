//! Output helpers: serializable belief snapshots and a Plotters heatmap.

use serde::Serialize;

use crate::belief::{Belief, BeliefCell};

/// One cell of a belief snapshot; `probability` is `None` for obstacles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeliefPoint {
    pub row: usize,
    pub col: usize,
    pub probability: Option<f64>,
}

/// Flatten a belief into row-major points.
pub fn snapshot(belief: &Belief) -> Vec<BeliefPoint> {
    (0..belief.rows())
        .flat_map(|row| (0..belief.cols()).map(move |col| (row, col)))
        .map(|(row, col)| BeliefPoint { row, col, probability: belief.weight(row, col) })
        .collect()
}

//============== Plotters Backend ==============

/// Static heatmap: open cells shaded by weight relative to the peak, obstacles black.
pub fn render_belief_heatmap(filename: &str, belief: &Belief) -> Result<(), Box<dyn std::error::Error>> {
    use plotters::prelude::*;
    let (rows, cols) = (belief.rows(), belief.cols());
    let root = BitMapBackend::new(filename, (80 * cols as u32 + 40, 80 * rows as u32 + 60)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Belief", ("sans-serif", 20))
        .margin(10)
        .build_cartesian_2d(0..cols, 0..rows)?;
    chart.configure_mesh().disable_mesh().draw()?;

    let peak = belief
        .most_likely()
        .map(|(_, _, p)| p)
        .filter(|p| *p > 0.0)
        .unwrap_or(1.0);
    // Row 0 is drawn at the top.
    chart.draw_series(
        (0..rows)
            .flat_map(|i| (0..cols).map(move |j| (i, j)))
            .map(|(i, j)| {
                let y = rows - 1 - i;
                let style = match belief.get(i, j) {
                    BeliefCell::Open(w) => BLUE.mix(w / peak).filled(),
                    BeliefCell::Obstacle => BLACK.filled(),
                };
                Rectangle::new([(j, y), (j + 1, y + 1)], style)
            }),
    )?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn test_snapshot_covers_every_cell() {
        let grid = Grid::from_rows(&[vec![0, 1], vec![0, 0]]).unwrap();
        let points = snapshot(&Belief::uniform(&grid));
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], BeliefPoint { row: 0, col: 1, probability: None });
        let json = serde_json::to_string(&points[1]).unwrap();
        assert_eq!(json, r#"{"row":0,"col":1,"probability":null}"#);
    }
}
