use biphasic_core::field::{PlotDomain, SolverConfig};
use biphasic_core::model::{parameter_specs, ParameterSet, State2D};
use biphasic_core::session::{RecomputeMode, SolverSession};
use js_sys::Float64Array;
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn to_js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{err}"))
}

/// Everything needed to start a session, bundled into one settings object
/// so the UI can pass its stored configuration in a single call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    pub parameters: ParameterSet,
    pub domain: PlotDomain,
    pub config: SolverConfig,
}

/// WASM-exported solver session for the phase-plane explorer UI.
///
/// The UI mutates inputs through the setters and reads the whole result
/// bundle back with `results`. The manual-apply toggle maps onto
/// `set_manual_mode` / `apply`.
#[wasm_bindgen]
pub struct WasmSolverSession {
    session: SolverSession,
}

#[wasm_bindgen]
impl WasmSolverSession {
    /// Creates a session with the default parameters, domain, and config.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmSolverSession, JsValue> {
        console_error_panic_hook::set_once();
        let session = SolverSession::with_defaults().map_err(to_js_err)?;
        Ok(WasmSolverSession { session })
    }

    /// Creates a session from an explicit settings object.
    pub fn with_settings(settings_val: JsValue) -> Result<WasmSolverSession, JsValue> {
        console_error_panic_hook::set_once();
        let settings: SessionSettings = from_value(settings_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid session settings: {e}")))?;
        let session = SolverSession::new(settings.parameters, settings.domain, settings.config)
            .map_err(to_js_err)?;
        Ok(WasmSolverSession { session })
    }

    /// Slider metadata: ids, labels, ranges, steps, and defaults.
    pub fn parameter_specs() -> Result<JsValue, JsValue> {
        to_value(parameter_specs()).map_err(|e| to_js_err(format!("Serialization error: {e}")))
    }

    pub fn set_parameter(&mut self, id: &str, value: f64) -> Result<(), JsValue> {
        self.session.set_parameter(id, value).map_err(to_js_err)
    }

    pub fn set_parameters(&mut self, params_val: JsValue) -> Result<(), JsValue> {
        let params: ParameterSet = from_value(params_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid parameter set: {e}")))?;
        self.session.set_parameters(params).map_err(to_js_err)
    }

    pub fn reset_parameters(&mut self) -> Result<(), JsValue> {
        self.session.reset_parameters().map_err(to_js_err)
    }

    pub fn set_domain(&mut self, domain_val: JsValue) -> Result<(), JsValue> {
        let domain: PlotDomain = from_value(domain_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid plot domain: {e}")))?;
        self.session.set_domain(domain).map_err(to_js_err)
    }

    pub fn set_config(&mut self, config_val: JsValue) -> Result<(), JsValue> {
        let config: SolverConfig = from_value(config_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid solver config: {e}")))?;
        self.session.set_config(config).map_err(to_js_err)
    }

    /// A click in phase space: seed a trajectory at (x, y).
    pub fn set_seed(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.session.set_seed(State2D::new(x, y)).map_err(to_js_err)
    }

    pub fn clear_seed(&mut self) -> Result<(), JsValue> {
        self.session.clear_seed().map_err(to_js_err)
    }

    /// True buffers edits until `apply`; false recomputes on every edit
    /// (and applies anything buffered).
    pub fn set_manual_mode(&mut self, manual: bool) -> Result<(), JsValue> {
        let mode = if manual {
            RecomputeMode::Manual
        } else {
            RecomputeMode::Auto
        };
        self.session.set_mode(mode).map_err(to_js_err)
    }

    pub fn is_manual(&self) -> bool {
        self.session.mode() == RecomputeMode::Manual
    }

    /// Applies buffered edits in manual mode.
    pub fn apply(&mut self) -> Result<(), JsValue> {
        self.session.commit().map_err(to_js_err)
    }

    /// The full result bundle: vector field, derivative grid, nullclines,
    /// fixed points, trajectory, and time-course.
    pub fn results(&self) -> Result<JsValue, JsValue> {
        to_value(self.session.results())
            .map_err(|e| to_js_err(format!("Serialization error: {e}")))
    }

    /// The trajectory as a packed (t, x, y) triple array for cheap
    /// transfer, or undefined when no seed has been supplied.
    pub fn trajectory_flat(&self) -> Option<Float64Array> {
        let trajectory = self.session.results().trajectory.as_ref()?;
        let mut flat = Vec::with_capacity(trajectory.len() * 3);
        for sample in trajectory {
            flat.push(sample.t);
            flat.push(sample.x);
            flat.push(sample.y);
        }
        Some(Float64Array::from(flat.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::{SessionSettings, WasmSolverSession};
    use biphasic_core::field::{PlotDomain, SolverConfig};
    use biphasic_core::model::ParameterSet;
    use biphasic_core::session::PhasePortrait;
    use serde_wasm_bindgen::{from_value, to_value};
    use wasm_bindgen_test::wasm_bindgen_test;

    fn settings_value(dt: f64) -> wasm_bindgen::JsValue {
        let settings = SessionSettings {
            parameters: ParameterSet::default(),
            domain: PlotDomain::default(),
            config: SolverConfig {
                dt,
                ..SolverConfig::default()
            },
        };
        to_value(&settings).expect("settings")
    }

    #[wasm_bindgen_test]
    fn fresh_session_publishes_fields_without_trajectory() {
        let session = WasmSolverSession::new().expect("session");
        let portrait: PhasePortrait =
            from_value(session.results().expect("results")).expect("portrait");

        assert!(!portrait.vector_field.is_empty());
        assert_eq!(portrait.grid.x_coords.len(), 51);
        assert!(portrait.trajectory.is_none());
        assert!(portrait.time_course.is_none());
        assert!(session.trajectory_flat().is_none());
    }

    #[wasm_bindgen_test]
    fn seeded_trajectory_transfers_as_packed_triples() {
        let mut session = WasmSolverSession::new().expect("session");
        session.set_seed(10.0, 10.0).expect("seed");

        let flat = session.trajectory_flat().expect("trajectory").to_vec();
        assert_eq!(flat.len() % 3, 0);
        assert_eq!(&flat[..3], &[0.0, 10.0, 10.0]);
        assert_eq!(flat[flat.len() - 3], 50.0);
    }

    #[wasm_bindgen_test]
    fn manual_mode_defers_recomputation_until_apply() {
        let mut session = WasmSolverSession::new().expect("session");
        session.set_manual_mode(true).expect("mode");
        session.set_seed(10.0, 10.0).expect("seed");
        assert!(session.trajectory_flat().is_none());

        session.apply().expect("apply");
        assert!(session.trajectory_flat().is_some());
    }

    #[wasm_bindgen_test]
    fn with_settings_rejects_a_zero_integration_step() {
        let result = WasmSolverSession::with_settings(settings_value(0.0));

        assert!(result.is_err(), "should reject dt = 0");
        let message = result
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("dt must be positive"));
    }

    #[wasm_bindgen_test]
    fn unknown_parameter_id_maps_to_a_js_error() {
        let mut session = WasmSolverSession::new().expect("session");
        let result = session.set_parameter("bogus", 1.0);

        assert!(result.is_err(), "should reject an unknown slider id");
        let message = result
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Unknown parameter"));
    }
}
