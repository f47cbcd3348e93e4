use crate::traits::PhasePlaneSystem;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Floor applied to the dissociation constants before division. The UI
/// already keeps Kdx/Kdy above 0.1, so this only matters under programmatic
/// misuse; the evaluator must never divide by zero regardless.
pub const KD_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
}

/// The ten kinetic parameters of the mutual-repression model.
///
/// Field names on the wire match the ids the UI layer uses for its sliders.
/// The set is immutable once handed to a computation; edits replace it
/// wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(rename = "alphaX")]
    pub alpha_x: f64,
    #[serde(rename = "alphaY")]
    pub alpha_y: f64,
    #[serde(rename = "Kdx")]
    pub kd_x: f64,
    #[serde(rename = "Kdy")]
    pub kd_y: f64,
    #[serde(rename = "nx")]
    pub n_x: f64,
    #[serde(rename = "ny")]
    pub n_y: f64,
    #[serde(rename = "dx")]
    pub d_x: f64,
    #[serde(rename = "dy")]
    pub d_y: f64,
    #[serde(rename = "Ix")]
    pub i_x: f64,
    #[serde(rename = "Iy")]
    pub i_y: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            alpha_x: 50.0,
            alpha_y: 50.0,
            kd_x: 30.0,
            kd_y: 30.0,
            n_x: 8.0,
            n_y: 8.0,
            d_x: 1.0,
            d_y: 1.0,
            i_x: 0.0,
            i_y: 0.0,
        }
    }
}

impl ParameterSet {
    /// Reads a parameter by its wire id.
    pub fn get(&self, id: &str) -> Result<f64, ModelError> {
        match id {
            "alphaX" => Ok(self.alpha_x),
            "alphaY" => Ok(self.alpha_y),
            "Kdx" => Ok(self.kd_x),
            "Kdy" => Ok(self.kd_y),
            "nx" => Ok(self.n_x),
            "ny" => Ok(self.n_y),
            "dx" => Ok(self.d_x),
            "dy" => Ok(self.d_y),
            "Ix" => Ok(self.i_x),
            "Iy" => Ok(self.i_y),
            _ => Err(ModelError::UnknownParameter(id.to_string())),
        }
    }

    /// Writes a parameter by its wire id. Used by the slider bridge; the
    /// admissible ranges are enforced by the UI, not here.
    pub fn set(&mut self, id: &str, value: f64) -> Result<(), ModelError> {
        match id {
            "alphaX" => self.alpha_x = value,
            "alphaY" => self.alpha_y = value,
            "Kdx" => self.kd_x = value,
            "Kdy" => self.kd_y = value,
            "nx" => self.n_x = value,
            "ny" => self.n_y = value,
            "dx" => self.d_x = value,
            "dy" => self.d_y = value,
            "Ix" => self.i_x = value,
            "Iy" => self.i_y = value,
            _ => return Err(ModelError::UnknownParameter(id.to_string())),
        }
        Ok(())
    }
}

/// Slider metadata for one parameter: wire id, display label, admissible
/// range, step granularity, and default value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

/// The ten slider definitions consumed by the UI layer.
pub fn parameter_specs() -> &'static [ParameterSpec] {
    const SPECS: [ParameterSpec; 10] = [
        ParameterSpec { id: "alphaX", label: "αx (Max Gen. Rate X)", min: 0.0, max: 100.0, step: 1.0, default: 50.0 },
        ParameterSpec { id: "alphaY", label: "αy (Max Gen. Rate Y)", min: 0.0, max: 100.0, step: 1.0, default: 50.0 },
        ParameterSpec { id: "Kdx", label: "Kdx (Dissoc. Const. X)", min: 0.1, max: 100.0, step: 0.1, default: 30.0 },
        ParameterSpec { id: "Kdy", label: "Kdy (Dissoc. Const. Y)", min: 0.1, max: 100.0, step: 0.1, default: 30.0 },
        ParameterSpec { id: "nx", label: "nx (Hill Coeff. X)", min: 1.0, max: 10.0, step: 0.1, default: 8.0 },
        ParameterSpec { id: "ny", label: "ny (Hill Coeff. Y)", min: 1.0, max: 10.0, step: 0.1, default: 8.0 },
        ParameterSpec { id: "dx", label: "dx (Degrad. Rate X)", min: 0.0, max: 5.0, step: 0.1, default: 1.0 },
        ParameterSpec { id: "dy", label: "dy (Degrad. Rate Y)", min: 0.0, max: 5.0, step: 0.1, default: 1.0 },
        ParameterSpec { id: "Ix", label: "Ix (Basal Input X)", min: 0.0, max: 100.0, step: 0.1, default: 0.0 },
        ParameterSpec { id: "Iy", label: "Iy (Basal Input Y)", min: 0.0, max: 100.0, step: 0.1, default: 0.0 },
    ];
    &SPECS
}

/// A point in phase space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct State2D {
    pub x: f64,
    pub y: f64,
}

impl State2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The two-variable mutual-repression (biphasic switch) model:
///
/// dx/dt = alphaX / (1 + (y/Kdy)^ny) - dx*x + Ix
/// dy/dt = alphaY / (1 + (x/Kdx)^nx) - dy*y + Iy
///
/// Evaluation is pure and total; non-finite inputs or extreme parameter
/// combinations propagate through rather than panic.
#[derive(Debug, Clone, Copy)]
pub struct BiphasicModel {
    pub params: ParameterSet,
}

impl BiphasicModel {
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }
}

impl PhasePlaneSystem<f64> for BiphasicModel {
    fn rates(&self, x: f64, y: f64) -> (f64, f64) {
        let p = &self.params;
        let safe_kd_y = p.kd_y.max(KD_EPSILON);
        let safe_kd_x = p.kd_x.max(KD_EPSILON);

        let dxdt = p.alpha_x / (1.0 + (y / safe_kd_y).powf(p.n_y)) - p.d_x * x + p.i_x;
        let dydt = p.alpha_y / (1.0 + (x / safe_kd_x).powf(p.n_x)) - p.d_y * y + p.i_y;

        (dxdt, dydt)
    }
}
