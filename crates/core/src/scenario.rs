//! Scenario presets
//!
//! A scenario picks one emitter and a bundle of uniform overrides. Applying a
//! scenario touches only the uniform block and the emitter choice; field
//! storage is never reallocated.
//!
//! # Example
//! ```
//! use smoke_sim_core::scenario::Scenario;
//!
//! let fire = Scenario::fire_jet();
//! assert!(fire.overrides.get("emit_fuel").unwrap_or(0.0) > 0.0);
//! assert!(Scenario::from_name("no-such-scenario").is_err());
//! ```

use crate::error::{Result, SimulationError};
use crate::solver::{EmitterKind, UniformPatch};
use serde::{Deserialize, Serialize};

/// Scenario used when a configuration names none
pub const DEFAULT_SCENARIO: &str = "smoke-column";

/// Named emitter plus uniform overrides
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Preset name (e.g. "smoke-column", "fire-jet")
    pub name: String,

    /// Emitter dispatched at the start of each step
    pub emitter: EmitterKind,

    /// Uniform values applied on top of the defaults
    ///
    /// Structural settings (boundary, pressure schedule, time) are carried
    /// over from the running simulation and should not appear here.
    pub overrides: UniformPatch,

    /// Whether vorticity confinement runs when a simulation is built with this
    /// scenario and no explicit toggle
    pub vorticity: bool,
}

impl Scenario {
    const NAMES: &'static [&'static str] =
        &["smoke-column", "fire-jet", "spheres", "vortex-chamber", "brush"];

    /// Names of the built-in presets
    pub fn names() -> &'static [&'static str] {
        Self::NAMES
    }

    /// Look up a built-in preset
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownScenario`] for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "smoke-column" => Ok(Self::smoke_column()),
            "fire-jet" => Ok(Self::fire_jet()),
            "spheres" => Ok(Self::spheres()),
            "vortex-chamber" => Ok(Self::vortex_chamber()),
            "brush" => Ok(Self::brush()),
            _ => Err(SimulationError::UnknownScenario(name.to_string())),
        }
    }

    /// Custom preset
    pub fn custom(
        name: impl Into<String>,
        emitter: EmitterKind,
        overrides: UniformPatch,
        vorticity: bool,
    ) -> Self {
        Scenario {
            name: name.into(),
            emitter,
            overrides,
            vorticity,
        }
    }

    /// Warm smoke rising from a precessing source near the floor
    pub fn smoke_column() -> Self {
        Scenario {
            name: "smoke-column".to_string(),
            emitter: EmitterKind::RotatingSmoke,
            overrides: UniformPatch::new()
                .with("emit_temperature", 1.0)
                .with("emit_speed", 14.0)
                .with("buoyancy", 4.0)
                .with("smoke_decay", 0.2)
                .with("vorticity", 0.25),
            vorticity: true,
        }
    }

    /// Fuel-laden jet that ignites and burns off as it rises
    pub fn fire_jet() -> Self {
        Scenario {
            name: "fire-jet".to_string(),
            emitter: EmitterKind::FireJet,
            overrides: UniformPatch::new()
                .with("emit_y", 0.1)
                .with("emit_radius", 0.1)
                .with("emit_speed", 24.0)
                .with("emit_fuel", 3.0)
                .with("emit_temperature", 1.5)
                .with("emit_smoke", 0.5)
                .with("emit_r", 0.25)
                .with("emit_g", 0.22)
                .with("emit_b", 0.2)
                .with("ignition_temperature", 0.4)
                .with("burn_rate", 2.5)
                .with("burn_heat_emit", 5.0)
                .with("burn_smoke_emit", 1.5)
                .with("buoyancy", 8.0)
                .with("temperature_decay", 1.2)
                .with("vorticity", 0.35),
            vorticity: true,
        }
    }

    /// Five tinted spheres orbiting the centre of the domain
    pub fn spheres() -> Self {
        Scenario {
            name: "spheres".to_string(),
            emitter: EmitterKind::Spheres,
            overrides: UniformPatch::new()
                .with("emit_y", 0.45)
                .with("emit_speed", 12.0)
                .with("emit_smoke", 5.0)
                .with("emit_temperature", 0.3)
                .with("buoyancy", 1.0)
                .with("smoke_decay", 0.15)
                .with("vorticity", 0.4),
            vorticity: true,
        }
    }

    /// Swirling chamber fed by a small rotating floor source
    pub fn vortex_chamber() -> Self {
        Scenario {
            name: "vortex-chamber".to_string(),
            emitter: EmitterKind::VortexChamber,
            overrides: UniformPatch::new()
                .with("emit_y", 0.1)
                .with("emit_radius", 0.08)
                .with("emit_speed", 10.0)
                .with("emit_temperature", 0.8)
                .with("chamber_swirl", 18.0)
                .with("chamber_inflow", 5.0)
                .with("velocity_decay", 0.05)
                .with("vorticity", 0.5),
            vorticity: true,
        }
    }

    /// Pointer-driven painting; nothing is emitted until the brush moves
    pub fn brush() -> Self {
        Scenario {
            name: "brush".to_string(),
            emitter: EmitterKind::Brush,
            overrides: UniformPatch::new()
                .with("brush_strength", 8.0)
                .with("brush_smoke", 8.0)
                .with("brush_temperature", 1.5)
                .with("buoyancy", 3.0)
                .with("smoke_decay", 0.25),
            vorticity: false,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::smoke_column()
    }
}
