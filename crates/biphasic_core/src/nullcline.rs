use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Zero-level-set geometry extracted from a scalar grid: flattened (x, y)
/// point coordinates plus segment index pairs into them. A renderer without
/// a contour primitive can draw these directly; one with a contour
/// primitive can ignore them and trace the derivative grid itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NullclineSegments {
    pub points: Vec<f64>,
    pub segments: Vec<u32>,
}

impl NullclineSegments {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Extracts the zero contour of `values` by marching squares with linear
/// edge interpolation. `values` rows follow `y_coords`, columns follow
/// `x_coords`; a grid smaller than 2x2 yields empty geometry.
pub fn extract_zero_contour(
    x_coords: &[f64],
    y_coords: &[f64],
    values: &[Vec<f64>],
) -> Result<NullclineSegments> {
    if values.len() != y_coords.len() {
        bail!(
            "Value row count ({}) does not match y coordinate count ({}).",
            values.len(),
            y_coords.len()
        );
    }
    for row in values {
        if row.len() != x_coords.len() {
            bail!(
                "Value column count ({}) does not match x coordinate count ({}).",
                row.len(),
                x_coords.len()
            );
        }
    }

    let mut geometry = NullclineSegments::default();
    if x_coords.len() < 2 || y_coords.len() < 2 {
        return Ok(geometry);
    }

    let mut point_count = 0u32;
    for iy in 0..y_coords.len() - 1 {
        let y0 = y_coords[iy];
        let y1 = y_coords[iy + 1];
        for ix in 0..x_coords.len() - 1 {
            let x0 = x_coords[ix];
            let x1 = x_coords[ix + 1];
            let v0 = values[iy][ix];
            let v1 = values[iy][ix + 1];
            let v2 = values[iy + 1][ix + 1];
            let v3 = values[iy + 1][ix];

            let mut case_index = 0u8;
            if v0 >= 0.0 {
                case_index |= 1;
            }
            if v1 >= 0.0 {
                case_index |= 2;
            }
            if v2 >= 0.0 {
                case_index |= 4;
            }
            if v3 >= 0.0 {
                case_index |= 8;
            }

            for (edge_a, edge_b) in marching_squares_edge_pairs(case_index) {
                let (ax, ay) = interpolate_square_edge(*edge_a, x0, x1, y0, y1, v0, v1, v2, v3);
                let (bx, by) = interpolate_square_edge(*edge_b, x0, x1, y0, y1, v0, v1, v2, v3);
                geometry.points.push(ax);
                geometry.points.push(ay);
                geometry.points.push(bx);
                geometry.points.push(by);
                geometry.segments.push(point_count);
                geometry.segments.push(point_count + 1);
                point_count += 2;
            }
        }
    }

    Ok(geometry)
}

fn marching_squares_edge_pairs(case_index: u8) -> &'static [(u8, u8)] {
    match case_index {
        0 | 15 => &[],
        1 => &[(3, 0)],
        2 => &[(0, 1)],
        3 => &[(3, 1)],
        4 => &[(1, 2)],
        5 => &[(3, 2), (0, 1)],
        6 => &[(0, 2)],
        7 => &[(3, 2)],
        8 => &[(2, 3)],
        9 => &[(0, 2)],
        10 => &[(0, 3), (1, 2)],
        11 => &[(1, 2)],
        12 => &[(1, 3)],
        13 => &[(0, 1)],
        14 => &[(3, 0)],
        _ => &[],
    }
}

fn interpolate_square_edge(
    edge: u8,
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
    v0: f64,
    v1: f64,
    v2: f64,
    v3: f64,
) -> (f64, f64) {
    match edge {
        0 => {
            let t = interpolate_factor(v0, v1);
            (x0 + (x1 - x0) * t, y0)
        }
        1 => {
            let t = interpolate_factor(v1, v2);
            (x1, y0 + (y1 - y0) * t)
        }
        2 => {
            let t = interpolate_factor(v2, v3);
            (x1 + (x0 - x1) * t, y1)
        }
        3 => {
            let t = interpolate_factor(v3, v0);
            (x0, y1 + (y0 - y1) * t)
        }
        _ => (x0, y0),
    }
}

fn interpolate_factor(v0: f64, v1: f64) -> f64 {
    let denominator = v0 - v1;
    if denominator.abs() <= 1e-12 {
        0.5
    } else {
        (v0 / denominator).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::extract_zero_contour;
    use crate::field::{sample_derivative_grid, PlotDomain};
    use crate::traits::PhasePlaneSystem;

    /// dx/dt = x - 2: x-nullcline is the vertical line x = 2.
    struct VerticalLine;

    impl PhasePlaneSystem<f64> for VerticalLine {
        fn rates(&self, x: f64, _y: f64) -> (f64, f64) {
            (x - 2.0, 1.0)
        }
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn vertical_nullcline_is_traced_at_the_root() {
        let domain = PlotDomain {
            x_min: 0.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 4.0,
            t_max: 10.0,
        };
        let grid = sample_derivative_grid(&VerticalLine, &domain, 8);
        let contour = extract_zero_contour(&grid.x_coords, &grid.y_coords, &grid.dxdt).unwrap();

        assert!(!contour.is_empty());
        assert_eq!(contour.segments.len() % 2, 0);
        // Every contour point lies on x = 2.
        for pair in contour.points.chunks(2) {
            assert!((pair[0] - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn sign_free_grid_has_no_contour() {
        let domain = PlotDomain {
            x_min: 3.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 1.0,
            t_max: 10.0,
        };
        // x - 2 is strictly positive over [3, 4]: nothing to trace.
        let grid = sample_derivative_grid(&VerticalLine, &domain, 4);
        let contour = extract_zero_contour(&grid.x_coords, &grid.y_coords, &grid.dxdt).unwrap();
        assert!(contour.is_empty());
    }

    #[test]
    fn tiny_grids_yield_empty_geometry() {
        let contour = extract_zero_contour(&[0.0], &[0.0], &[vec![1.0]]).unwrap();
        assert!(contour.is_empty());
        let contour = extract_zero_contour(&[], &[], &[]).unwrap();
        assert!(contour.is_empty());
    }

    #[test]
    fn mismatched_shapes_are_rejected() {
        assert_err_contains(
            extract_zero_contour(&[0.0, 1.0], &[0.0, 1.0], &[vec![1.0, 1.0]]),
            "row count",
        );
        assert_err_contains(
            extract_zero_contour(&[0.0, 1.0], &[0.0, 1.0], &[vec![1.0], vec![1.0]]),
            "column count",
        );
    }

    #[test]
    fn segment_indices_reference_existing_points() {
        let domain = PlotDomain {
            x_min: 0.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 4.0,
            t_max: 10.0,
        };
        let grid = sample_derivative_grid(&VerticalLine, &domain, 6);
        let contour = extract_zero_contour(&grid.x_coords, &grid.y_coords, &grid.dxdt).unwrap();
        let point_count = (contour.points.len() / 2) as u32;
        for &index in &contour.segments {
            assert!(index < point_count);
        }
    }
}
