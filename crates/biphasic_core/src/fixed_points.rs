use crate::field::DerivativeGrid;
use serde::{Deserialize, Serialize};

/// A grid node where both derivative magnitudes fall below the detection
/// threshold. This is a grid-resolution-bound approximation of a true fixed
/// point, not a root-solver result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPoint {
    pub x: f64,
    pub y: f64,
}

/// Scans the derivative grid for approximate fixed points: nodes where
/// |dx/dt| and |dy/dt| are both below `threshold`. The scan runs row-major
/// in the grid's y-then-x order and the output preserves that order.
/// Adjacent cells straddling a true root may both qualify; duplicates are
/// reported as-is.
pub fn detect_fixed_points(grid: &DerivativeGrid, threshold: f64) -> Vec<FixedPoint> {
    let mut points = Vec::new();
    for (iy, &y) in grid.y_coords.iter().enumerate() {
        for (ix, &x) in grid.x_coords.iter().enumerate() {
            if grid.dxdt[iy][ix].abs() < threshold && grid.dydt[iy][ix].abs() < threshold {
                points.push(FixedPoint { x, y });
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::detect_fixed_points;
    use crate::field::{sample_derivative_grid, DerivativeGrid, PlotDomain};
    use crate::model::{BiphasicModel, ParameterSet};
    use crate::traits::PhasePlaneSystem;

    /// dx/dt = x - 1, dy/dt = y - 2: single true fixed point at (1, 2).
    struct ShiftedLinear;

    impl PhasePlaneSystem<f64> for ShiftedLinear {
        fn rates(&self, x: f64, y: f64) -> (f64, f64) {
            (x - 1.0, y - 2.0)
        }
    }

    fn unit_domain() -> PlotDomain {
        PlotDomain {
            x_min: 0.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 4.0,
            t_max: 10.0,
        }
    }

    #[test]
    fn finds_grid_nodes_near_the_true_root() {
        let grid = sample_derivative_grid(&ShiftedLinear, &unit_domain(), 4);
        // Nodes sit on integers; only (1, 2) has both derivatives inside
        // the threshold.
        let points = detect_fixed_points(&grid, 0.5);
        assert_eq!(points.len(), 1);
        assert_eq!((points[0].x, points[0].y), (1.0, 2.0));
    }

    #[test]
    fn coarse_threshold_reports_adjacent_duplicates() {
        let grid = sample_derivative_grid(&ShiftedLinear, &unit_domain(), 4);
        // A threshold wider than the grid spacing qualifies a whole
        // neighborhood; that imprecision is deliberate.
        let points = detect_fixed_points(&grid, 1.5);
        assert!(points.len() > 1);
    }

    #[test]
    fn scan_order_is_y_then_x_and_idempotent() {
        let grid = sample_derivative_grid(&ShiftedLinear, &unit_domain(), 8);
        let first = detect_fixed_points(&grid, 0.75);
        let second = detect_fixed_points(&grid, 0.75);
        assert_eq!(first, second);
        for pair in first.windows(2) {
            let ordered = pair[0].y < pair[1].y || (pair[0].y == pair[1].y && pair[0].x < pair[1].x);
            assert!(ordered);
        }
    }

    #[test]
    fn empty_grid_yields_empty_set() {
        let points = detect_fixed_points(&DerivativeGrid::default(), 0.1);
        assert!(points.is_empty());
    }

    #[test]
    fn default_model_has_detectable_fixed_points() {
        let model = BiphasicModel::new(ParameterSet::default());
        let grid = sample_derivative_grid(&model, &PlotDomain::default(), 50);
        // The symmetric defaults produce a bistable switch; the coarse scan
        // may or may not land on a node within threshold, but it must never
        // panic and must be deterministic.
        let points = detect_fixed_points(&grid, 0.1);
        assert_eq!(points, detect_fixed_points(&grid, 0.1));
    }
}
