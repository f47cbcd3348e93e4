use crate::traits::PhasePlaneSystem;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Axis bounds of the phase-plane plot and the simulation horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotDomain {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub t_max: f64,
}

impl Default for PlotDomain {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 100.0,
            y_min: 0.0,
            y_max: 100.0,
            t_max: 50.0,
        }
    }
}

/// Numerical settings: integration step, the two grid densities, and the
/// fixed-point detection threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    pub dt: f64,
    pub vector_field_grid_density: usize,
    pub nullcline_grid_density: usize,
    pub fixed_point_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            vector_field_grid_density: 20,
            nullcline_grid_density: 50,
            fixed_point_threshold: 0.1,
        }
    }
}

/// Vector-field arrows as one disjoint polyline: coordinate runs separated
/// by `None` path breaks (serialized as `null`), ready for a batch renderer
/// to draw in a single pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VectorField {
    pub xs: Vec<Option<f64>>,
    pub ys: Vec<Option<f64>>,
}

impl VectorField {
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Both derivative components sampled on a shared regular grid. Rows of
/// `dxdt`/`dydt` follow `y_coords`, columns follow `x_coords` (the `z`
/// convention of contour renderers). This grid feeds both nullcline
/// extraction and fixed-point detection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivativeGrid {
    pub x_coords: Vec<f64>,
    pub y_coords: Vec<f64>,
    pub dxdt: Vec<Vec<f64>>,
    pub dydt: Vec<Vec<f64>>,
}

impl DerivativeGrid {
    pub fn is_empty(&self) -> bool {
        self.x_coords.is_empty() || self.y_coords.is_empty()
    }
}

fn push_stroke(
    xs: &mut Vec<Option<f64>>,
    ys: &mut Vec<Option<f64>>,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
) {
    xs.push(Some(x0));
    xs.push(Some(x1));
    xs.push(None);
    ys.push(Some(y0));
    ys.push(Some(y1));
    ys.push(None);
}

/// Samples the vector field on a `density` x `density` grid spanning the
/// domain inclusive of both edges. Every node with a nonzero derivative
/// yields a fixed-length arrow (body plus two arrowhead strokes) pointing
/// along the normalized derivative direction; the body length is
/// min(width, height) / density / 5 and the head is 30% of the body at a
/// 30 degree half-angle. A density of 1 or less yields an empty field (the
/// edge normalization would otherwise divide by zero).
pub fn sample_vector_field(
    system: &impl PhasePlaneSystem<f64>,
    domain: &PlotDomain,
    density: usize,
) -> VectorField {
    let mut field = VectorField::default();
    if density <= 1 {
        return field;
    }

    let width = domain.x_max - domain.x_min;
    let height = domain.y_max - domain.y_min;
    let body_length = width.min(height) / density as f64 / 5.0;
    let head_length = body_length * 0.3;
    let head_angle = PI / 6.0;
    let denom = (density - 1) as f64;

    for i in 0..density {
        for j in 0..density {
            let x0 = domain.x_min + (i as f64 / denom) * width;
            let y0 = domain.y_min + (j as f64 / denom) * height;
            let (dxdt, dydt) = system.rates(x0, y0);

            let norm = (dxdt * dxdt + dydt * dydt).sqrt();
            if norm == 0.0 {
                continue;
            }

            let x1 = x0 + body_length * (dxdt / norm);
            let y1 = y0 + body_length * (dydt / norm);
            push_stroke(&mut field.xs, &mut field.ys, x0, y0, x1, y1);

            let angle = dydt.atan2(dxdt);
            let head_x1 = x1 - head_length * (angle - head_angle).cos();
            let head_y1 = y1 - head_length * (angle - head_angle).sin();
            push_stroke(&mut field.xs, &mut field.ys, x1, y1, head_x1, head_y1);

            let head_x2 = x1 - head_length * (angle + head_angle).cos();
            let head_y2 = y1 - head_length * (angle + head_angle).sin();
            push_stroke(&mut field.xs, &mut field.ys, x1, y1, head_x2, head_y2);
        }
    }

    field
}

/// Evaluates both derivative components on a (density + 1) x (density + 1)
/// grid spanning the domain inclusive of both edges. A density of 0 yields
/// an empty grid. The grid is independent of the vector-field grid and the
/// two need not share node coordinates.
pub fn sample_derivative_grid(
    system: &impl PhasePlaneSystem<f64>,
    domain: &PlotDomain,
    density: usize,
) -> DerivativeGrid {
    let mut grid = DerivativeGrid::default();
    if density == 0 {
        return grid;
    }

    let width = domain.x_max - domain.x_min;
    let height = domain.y_max - domain.y_min;
    for i in 0..=density {
        let frac = i as f64 / density as f64;
        grid.x_coords.push(domain.x_min + frac * width);
        grid.y_coords.push(domain.y_min + frac * height);
    }

    for &y in &grid.y_coords {
        let mut dx_row = Vec::with_capacity(grid.x_coords.len());
        let mut dy_row = Vec::with_capacity(grid.x_coords.len());
        for &x in &grid.x_coords {
            let (dxdt, dydt) = system.rates(x, y);
            dx_row.push(dxdt);
            dy_row.push(dydt);
        }
        grid.dxdt.push(dx_row);
        grid.dydt.push(dy_row);
    }

    grid
}
