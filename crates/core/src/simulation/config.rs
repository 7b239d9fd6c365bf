//! Construction and per-step options

use crate::grid::Boundary;
use crate::solver::{PressureSolver, UniformPatch};
use serde::{Deserialize, Serialize};

/// Construction input for [`super::SmokeSimulation`]
///
/// Optional fields fall back to the scenario's choice (vorticity) or the
/// uniform defaults (pressure iterations, boundary).
///
/// # Example
/// ```
/// use smoke_sim_core::simulation::SimulationConfig;
///
/// let config = SimulationConfig {
///     scenario: Some("fire-jet".to_string()),
///     pressure_iterations: Some(30),
///     ..SimulationConfig::with_size(48, 64, 48)
/// };
/// assert_eq!(config.height, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Cells along x
    pub width: usize,
    /// Cells along y (up)
    pub height: usize,
    /// Cells along z
    pub depth: usize,
    /// Built-in scenario name; `None` selects the default scenario
    pub scenario: Option<String>,
    /// Pressure iterations per step
    pub pressure_iterations: Option<u32>,
    /// Force vorticity confinement on or off
    pub vorticity: Option<bool>,
    /// Pressure iteration schedule
    pub pressure_solver: PressureSolver,
    /// Face behaviour
    pub boundary: Option<Boundary>,
    /// Extra uniform values applied after the scenario's overrides
    pub uniforms: UniformPatch,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            depth: 32,
            scenario: None,
            pressure_iterations: None,
            vorticity: None,
            pressure_solver: PressureSolver::default(),
            boundary: None,
            uniforms: UniformPatch::default(),
        }
    }
}

impl SimulationConfig {
    /// Default configuration for a `width × height × depth` grid
    pub fn with_size(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            ..Self::default()
        }
    }
}

/// Per-call switches for [`super::SmokeSimulation::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOptions {
    /// Run the scenario's emitter this step
    pub emitters: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self { emitters: true }
    }
}

impl StepOptions {
    /// Step with emitters switched off
    pub const fn without_emitters() -> Self {
        Self { emitters: false }
    }
}
