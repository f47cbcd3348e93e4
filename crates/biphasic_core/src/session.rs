use crate::field::{
    sample_derivative_grid, sample_vector_field, DerivativeGrid, PlotDomain, SolverConfig,
    VectorField,
};
use crate::fixed_points::{detect_fixed_points, FixedPoint};
use crate::model::{BiphasicModel, ParameterSet, State2D};
use crate::nullcline::{extract_zero_contour, NullclineSegments};
use crate::solvers::{integrate_trajectory, TrajectorySample};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Integration step dt must be positive and finite (got {0}).")]
    InvalidStep(f64),
    #[error("Domain axis ranges must be finite with max > min.")]
    InvalidDomain,
    #[error("Maximum simulation time must be positive and finite (got {0}).")]
    InvalidHorizon(f64),
    #[error("Fixed-point threshold must be non-negative and finite (got {0}).")]
    InvalidThreshold(f64),
}

/// When recomputation runs: on every edit, or only on an explicit commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeMode {
    Auto,
    Manual,
}

/// The two time-course series of an integrated trajectory, stored as
/// columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeCourse {
    pub t: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl TimeCourse {
    fn from_samples(samples: &[TrajectorySample]) -> Self {
        let mut course = Self {
            t: Vec::with_capacity(samples.len()),
            x: Vec::with_capacity(samples.len()),
            y: Vec::with_capacity(samples.len()),
        };
        for sample in samples {
            course.t.push(sample.t);
            course.x.push(sample.x);
            course.y.push(sample.y);
        }
        course
    }
}

/// The full result bundle handed to the rendering layer. The derivative
/// grid carries its axis coordinates and serves as the contour source for
/// both nullclines; the extracted segments are provided alongside for
/// renderers without a contour primitive. Trajectory and time-course are
/// `None` until a seed has been supplied, which is distinct from an empty
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhasePortrait {
    pub vector_field: VectorField,
    pub grid: DerivativeGrid,
    pub x_nullcline: NullclineSegments,
    pub y_nullcline: NullclineSegments,
    pub fixed_points: Vec<FixedPoint>,
    pub trajectory: Option<Vec<TrajectorySample>>,
    pub time_course: Option<TimeCourse>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Inputs {
    params: ParameterSet,
    domain: PlotDomain,
    config: SolverConfig,
    seed: Option<State2D>,
}

/// Single entry point for the rendering layer: owns the current inputs,
/// recomputes the derived datasets when they change, and publishes them as
/// one immutable bundle.
///
/// The field datasets depend on parameters, domain, and config only; the
/// trajectory additionally depends on the seed, so a seed change never
/// re-samples the grids. In `Manual` mode edits accumulate until `commit`;
/// in `Auto` mode every edit commits immediately. The portrait is swapped
/// wholesale on recompute, so a reader never observes a partially updated
/// bundle.
#[derive(Debug)]
pub struct SolverSession {
    current: Inputs,
    pending: Inputs,
    mode: RecomputeMode,
    portrait: PhasePortrait,
}

impl SolverSession {
    pub fn new(params: ParameterSet, domain: PlotDomain, config: SolverConfig) -> Result<Self> {
        validate_domain(&domain)?;
        validate_config(&config)?;
        let inputs = Inputs {
            params,
            domain,
            config,
            seed: None,
        };
        let (vector_field, grid, x_nullcline, y_nullcline, fixed_points) =
            compute_fields(&inputs)?;
        Ok(Self {
            current: inputs,
            pending: inputs,
            mode: RecomputeMode::Auto,
            portrait: PhasePortrait {
                vector_field,
                grid,
                x_nullcline,
                y_nullcline,
                fixed_points,
                trajectory: None,
                time_course: None,
            },
        })
    }

    /// Defaults: the parameter set, domain, and config the UI starts with.
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            ParameterSet::default(),
            PlotDomain::default(),
            SolverConfig::default(),
        )
    }

    pub fn results(&self) -> &PhasePortrait {
        &self.portrait
    }

    pub fn mode(&self) -> RecomputeMode {
        self.mode
    }

    /// The committed inputs backing the current portrait.
    pub fn parameters(&self) -> &ParameterSet {
        &self.current.params
    }

    pub fn domain(&self) -> &PlotDomain {
        &self.current.domain
    }

    pub fn config(&self) -> &SolverConfig {
        &self.current.config
    }

    pub fn seed(&self) -> Option<State2D> {
        self.current.seed
    }

    pub fn set_parameters(&mut self, params: ParameterSet) -> Result<()> {
        self.pending.params = params;
        self.commit_if_auto()
    }

    /// Slider entry point: one parameter by wire id.
    pub fn set_parameter(&mut self, id: &str, value: f64) -> Result<()> {
        self.pending.params.set(id, value)?;
        self.commit_if_auto()
    }

    pub fn reset_parameters(&mut self) -> Result<()> {
        self.pending.params = ParameterSet::default();
        self.commit_if_auto()
    }

    pub fn set_domain(&mut self, domain: PlotDomain) -> Result<()> {
        validate_domain(&domain)?;
        self.pending.domain = domain;
        self.commit_if_auto()
    }

    pub fn set_config(&mut self, config: SolverConfig) -> Result<()> {
        validate_config(&config)?;
        self.pending.config = config;
        self.commit_if_auto()
    }

    /// Sets the trajectory seed (a click in phase space).
    pub fn set_seed(&mut self, seed: State2D) -> Result<()> {
        self.pending.seed = Some(seed);
        self.commit_if_auto()
    }

    pub fn clear_seed(&mut self) -> Result<()> {
        self.pending.seed = None;
        self.commit_if_auto()
    }

    /// Switching back to `Auto` commits any buffered edits.
    pub fn set_mode(&mut self, mode: RecomputeMode) -> Result<()> {
        self.mode = mode;
        match mode {
            RecomputeMode::Auto => self.commit(),
            RecomputeMode::Manual => Ok(()),
        }
    }

    /// Applies pending edits and recomputes exactly the datasets whose
    /// inputs changed.
    pub fn commit(&mut self) -> Result<()> {
        let fields_dirty = self.pending.params != self.current.params
            || self.pending.domain != self.current.domain
            || self.pending.config != self.current.config;
        let trajectory_dirty = fields_dirty || self.pending.seed != self.current.seed;
        if !trajectory_dirty {
            return Ok(());
        }

        let mut next = self.portrait.clone();
        if fields_dirty {
            let (vector_field, grid, x_nullcline, y_nullcline, fixed_points) =
                compute_fields(&self.pending)?;
            next.vector_field = vector_field;
            next.grid = grid;
            next.x_nullcline = x_nullcline;
            next.y_nullcline = y_nullcline;
            next.fixed_points = fixed_points;
        }
        let (trajectory, time_course) = compute_trajectory(&self.pending)?;
        next.trajectory = trajectory;
        next.time_course = time_course;

        self.current = self.pending;
        self.portrait = next;
        Ok(())
    }

    fn commit_if_auto(&mut self) -> Result<()> {
        match self.mode {
            RecomputeMode::Auto => self.commit(),
            RecomputeMode::Manual => Ok(()),
        }
    }
}

type FieldDatasets = (
    VectorField,
    DerivativeGrid,
    NullclineSegments,
    NullclineSegments,
    Vec<FixedPoint>,
);

fn compute_fields(inputs: &Inputs) -> Result<FieldDatasets> {
    let model = BiphasicModel::new(inputs.params);
    let vector_field = sample_vector_field(
        &model,
        &inputs.domain,
        inputs.config.vector_field_grid_density,
    );
    let grid = sample_derivative_grid(&model, &inputs.domain, inputs.config.nullcline_grid_density);
    let x_nullcline = extract_zero_contour(&grid.x_coords, &grid.y_coords, &grid.dxdt)?;
    let y_nullcline = extract_zero_contour(&grid.x_coords, &grid.y_coords, &grid.dydt)?;
    let fixed_points = detect_fixed_points(&grid, inputs.config.fixed_point_threshold);
    Ok((vector_field, grid, x_nullcline, y_nullcline, fixed_points))
}

fn compute_trajectory(
    inputs: &Inputs,
) -> Result<(Option<Vec<TrajectorySample>>, Option<TimeCourse>)> {
    match inputs.seed {
        None => Ok((None, None)),
        Some(seed) => {
            let model = BiphasicModel::new(inputs.params);
            let samples =
                integrate_trajectory(&model, seed, inputs.domain.t_max, inputs.config.dt)?;
            let course = TimeCourse::from_samples(&samples);
            Ok((Some(samples), Some(course)))
        }
    }
}

fn validate_domain(domain: &PlotDomain) -> Result<(), SettingsError> {
    let finite = domain.x_min.is_finite()
        && domain.x_max.is_finite()
        && domain.y_min.is_finite()
        && domain.y_max.is_finite();
    if !finite || domain.x_max <= domain.x_min || domain.y_max <= domain.y_min {
        return Err(SettingsError::InvalidDomain);
    }
    if !domain.t_max.is_finite() || domain.t_max <= 0.0 {
        return Err(SettingsError::InvalidHorizon(domain.t_max));
    }
    Ok(())
}

fn validate_config(config: &SolverConfig) -> Result<(), SettingsError> {
    if !config.dt.is_finite() || config.dt <= 0.0 {
        return Err(SettingsError::InvalidStep(config.dt));
    }
    if !config.fixed_point_threshold.is_finite() || config.fixed_point_threshold < 0.0 {
        return Err(SettingsError::InvalidThreshold(config.fixed_point_threshold));
    }
    Ok(())
}
