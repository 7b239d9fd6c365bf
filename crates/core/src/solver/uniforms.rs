//! Uniform parameter block
//!
//! One flat struct holds every knob the kernels read. The orchestrator owns it,
//! mutates it once per step (`dt`, `t`) and passes it by reference into every
//! stage. It is `#[repr(C)]` and [`bytemuck::Pod`] so a device backend can
//! upload it unchanged.
//!
//! Positions are normalised domain coordinates in `[0, 1]`; radii are fractions
//! of the smallest grid axis; velocities are in cells per second.

use crate::error::{Result, SimulationError};
use crate::grid::Boundary;
use bytemuck::{Pod, Zeroable};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Lower bound of the internal timestep
pub const DT_MIN: f32 = 1.0e-4;

/// Every tunable value read by the kernels
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Uniforms {
    // Time and grid spacing
    /// Clamped timestep of the current step (s)
    pub dt: f32,
    /// Accumulated simulation time (s)
    pub t: f32,
    /// Upper bound of the internal timestep (s)
    pub dt_max: f32,
    /// Cell size
    pub dx: f32,
    /// Reciprocal cell size
    pub rdx: f32,

    // Exponential decay rates (1/s)
    pub velocity_decay: f32,
    pub smoke_decay: f32,
    pub temperature_decay: f32,
    pub pressure_decay: f32,
    pub fuel_decay: f32,

    // Combustion
    /// Temperature above which stored fuel burns
    pub ignition_temperature: f32,
    /// Fuel consumed per second in burning cells
    pub burn_rate: f32,
    /// Heat added per unit of burned fuel
    pub burn_heat_emit: f32,
    /// Smoke density added per unit of burned fuel
    pub burn_smoke_emit: f32,
    pub burn_smoke_r: f32,
    pub burn_smoke_g: f32,
    pub burn_smoke_b: f32,

    // Forces
    /// Upward acceleration per unit temperature
    pub buoyancy: f32,
    /// Vorticity confinement strength
    pub vorticity: f32,

    // Emitter
    pub emit_x: f32,
    pub emit_y: f32,
    pub emit_z: f32,
    pub emit_radius: f32,
    /// Injected speed (cells/s)
    pub emit_speed: f32,
    /// Rotation rate of rotating sources (rad/s)
    pub emit_spin: f32,
    pub emit_smoke: f32,
    pub emit_r: f32,
    pub emit_g: f32,
    pub emit_b: f32,
    pub emit_temperature: f32,
    pub emit_fuel: f32,

    // Choreographed spheres
    pub sphere_radius: f32,
    pub sphere_orbit: f32,
    pub sphere_speed: f32,

    // Vortex chamber
    pub chamber_swirl: f32,
    pub chamber_inflow: f32,

    // Interactive line brush
    pub brush_start_x: f32,
    pub brush_start_y: f32,
    pub brush_start_z: f32,
    pub brush_end_x: f32,
    pub brush_end_y: f32,
    pub brush_end_z: f32,
    pub brush_radius: f32,
    pub brush_vel_x: f32,
    pub brush_vel_y: f32,
    pub brush_vel_z: f32,
    pub brush_smoke: f32,
    pub brush_temperature: f32,
    pub brush_fuel: f32,
    /// Fraction of pointer velocity transferred to the fluid
    pub brush_strength: f32,

    // Flags and schedules
    /// Non-zero for walls on all faces
    pub enclosed: u32,
    /// Pressure relaxation passes per step
    pub pressure_iterations: u32,
    /// Coarse-level passes of the two-level pressure solver
    pub coarse_iterations: u32,
    /// Non-zero while the brush is held down
    pub brush_active: u32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            t: 0.0,
            dt_max: 1.0 / 30.0,
            dx: 1.0,
            rdx: 1.0,

            velocity_decay: 0.1,
            smoke_decay: 0.3,
            temperature_decay: 0.8,
            pressure_decay: 0.5,
            fuel_decay: 0.5,

            ignition_temperature: 0.5,
            burn_rate: 2.0,
            burn_heat_emit: 4.0,
            burn_smoke_emit: 1.0,
            burn_smoke_r: 0.2,
            burn_smoke_g: 0.18,
            burn_smoke_b: 0.16,

            buoyancy: 6.0,
            vorticity: 0.3,

            emit_x: 0.5,
            emit_y: 0.15,
            emit_z: 0.5,
            emit_radius: 0.12,
            emit_speed: 20.0,
            emit_spin: 1.5,
            emit_smoke: 4.0,
            emit_r: 0.9,
            emit_g: 0.9,
            emit_b: 0.95,
            emit_temperature: 2.0,
            emit_fuel: 0.0,

            sphere_radius: 0.08,
            sphere_orbit: 0.25,
            sphere_speed: 0.8,

            chamber_swirl: 15.0,
            chamber_inflow: 4.0,

            brush_start_x: 0.5,
            brush_start_y: 0.5,
            brush_start_z: 0.5,
            brush_end_x: 0.5,
            brush_end_y: 0.5,
            brush_end_z: 0.5,
            brush_radius: 0.05,
            brush_vel_x: 0.0,
            brush_vel_y: 0.0,
            brush_vel_z: 0.0,
            brush_smoke: 6.0,
            brush_temperature: 1.0,
            brush_fuel: 0.0,
            brush_strength: 1.0,

            enclosed: 0,
            pressure_iterations: 20,
            coarse_iterations: 8,
            brush_active: 0,
        }
    }
}

enum Slot<'a> {
    Float(&'a mut f32),
    Count(&'a mut u32),
}

impl Uniforms {
    /// Names accepted by [`Uniforms::set`], [`Uniforms::get`] and [`UniformPatch`]
    pub const NAMES: &'static [&'static str] = &[
        "dt",
        "t",
        "dt_max",
        "dx",
        "rdx",
        "velocity_decay",
        "smoke_decay",
        "temperature_decay",
        "pressure_decay",
        "fuel_decay",
        "ignition_temperature",
        "burn_rate",
        "burn_heat_emit",
        "burn_smoke_emit",
        "burn_smoke_r",
        "burn_smoke_g",
        "burn_smoke_b",
        "buoyancy",
        "vorticity",
        "emit_x",
        "emit_y",
        "emit_z",
        "emit_radius",
        "emit_speed",
        "emit_spin",
        "emit_smoke",
        "emit_r",
        "emit_g",
        "emit_b",
        "emit_temperature",
        "emit_fuel",
        "sphere_radius",
        "sphere_orbit",
        "sphere_speed",
        "chamber_swirl",
        "chamber_inflow",
        "brush_start_x",
        "brush_start_y",
        "brush_start_z",
        "brush_end_x",
        "brush_end_y",
        "brush_end_z",
        "brush_radius",
        "brush_vel_x",
        "brush_vel_y",
        "brush_vel_z",
        "brush_smoke",
        "brush_temperature",
        "brush_fuel",
        "brush_strength",
        "enclosed",
        "pressure_iterations",
        "coarse_iterations",
        "brush_active",
    ];

    fn slot(&mut self, name: &str) -> Option<Slot<'_>> {
        use Slot::{Count, Float};
        let slot = match name {
            "dt" => Float(&mut self.dt),
            "t" => Float(&mut self.t),
            "dt_max" => Float(&mut self.dt_max),
            "dx" => Float(&mut self.dx),
            "rdx" => Float(&mut self.rdx),
            "velocity_decay" => Float(&mut self.velocity_decay),
            "smoke_decay" => Float(&mut self.smoke_decay),
            "temperature_decay" => Float(&mut self.temperature_decay),
            "pressure_decay" => Float(&mut self.pressure_decay),
            "fuel_decay" => Float(&mut self.fuel_decay),
            "ignition_temperature" => Float(&mut self.ignition_temperature),
            "burn_rate" => Float(&mut self.burn_rate),
            "burn_heat_emit" => Float(&mut self.burn_heat_emit),
            "burn_smoke_emit" => Float(&mut self.burn_smoke_emit),
            "burn_smoke_r" => Float(&mut self.burn_smoke_r),
            "burn_smoke_g" => Float(&mut self.burn_smoke_g),
            "burn_smoke_b" => Float(&mut self.burn_smoke_b),
            "buoyancy" => Float(&mut self.buoyancy),
            "vorticity" => Float(&mut self.vorticity),
            "emit_x" => Float(&mut self.emit_x),
            "emit_y" => Float(&mut self.emit_y),
            "emit_z" => Float(&mut self.emit_z),
            "emit_radius" => Float(&mut self.emit_radius),
            "emit_speed" => Float(&mut self.emit_speed),
            "emit_spin" => Float(&mut self.emit_spin),
            "emit_smoke" => Float(&mut self.emit_smoke),
            "emit_r" => Float(&mut self.emit_r),
            "emit_g" => Float(&mut self.emit_g),
            "emit_b" => Float(&mut self.emit_b),
            "emit_temperature" => Float(&mut self.emit_temperature),
            "emit_fuel" => Float(&mut self.emit_fuel),
            "sphere_radius" => Float(&mut self.sphere_radius),
            "sphere_orbit" => Float(&mut self.sphere_orbit),
            "sphere_speed" => Float(&mut self.sphere_speed),
            "chamber_swirl" => Float(&mut self.chamber_swirl),
            "chamber_inflow" => Float(&mut self.chamber_inflow),
            "brush_start_x" => Float(&mut self.brush_start_x),
            "brush_start_y" => Float(&mut self.brush_start_y),
            "brush_start_z" => Float(&mut self.brush_start_z),
            "brush_end_x" => Float(&mut self.brush_end_x),
            "brush_end_y" => Float(&mut self.brush_end_y),
            "brush_end_z" => Float(&mut self.brush_end_z),
            "brush_radius" => Float(&mut self.brush_radius),
            "brush_vel_x" => Float(&mut self.brush_vel_x),
            "brush_vel_y" => Float(&mut self.brush_vel_y),
            "brush_vel_z" => Float(&mut self.brush_vel_z),
            "brush_smoke" => Float(&mut self.brush_smoke),
            "brush_temperature" => Float(&mut self.brush_temperature),
            "brush_fuel" => Float(&mut self.brush_fuel),
            "brush_strength" => Float(&mut self.brush_strength),
            "enclosed" => Count(&mut self.enclosed),
            "pressure_iterations" => Count(&mut self.pressure_iterations),
            "coarse_iterations" => Count(&mut self.coarse_iterations),
            "brush_active" => Count(&mut self.brush_active),
            _ => return None,
        };
        Some(slot)
    }

    /// Read a uniform by name
    ///
    /// Integer uniforms are returned as `f32`.
    pub fn get(&self, name: &str) -> Option<f32> {
        let mut copy = *self;
        copy.slot(name).map(|slot| match slot {
            Slot::Float(v) => *v,
            Slot::Count(v) => *v as f32,
        })
    }

    /// Write a uniform by name
    ///
    /// Integer uniforms round the value and saturate at zero. Writing `dx` or
    /// `rdx` keeps the other one consistent.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownUniform`] if no uniform has this name.
    pub fn set(&mut self, name: &str, value: f32) -> Result<()> {
        match self.slot(name) {
            Some(Slot::Float(v)) => *v = value,
            Some(Slot::Count(v)) => *v = value.round().max(0.0) as u32,
            None => return Err(SimulationError::UnknownUniform(name.to_string())),
        }
        match name {
            "dx" => self.rdx = self.dx.recip(),
            "rdx" => self.dx = self.rdx.recip(),
            _ => {}
        }
        Ok(())
    }

    /// Merge a partial update
    ///
    /// Every name is checked before anything is written, so a rejected patch
    /// leaves the block untouched.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::UnknownUniform`] for the first unknown name
    /// - [`SimulationError::ConflictingSpacing`] if the patch sets both `dx`
    ///   and `rdx`
    pub fn apply(&mut self, patch: &UniformPatch) -> Result<()> {
        if let Some(name) = patch.names().find(|name| !Self::NAMES.contains(name)) {
            return Err(SimulationError::UnknownUniform(name.to_string()));
        }
        if patch.get("dx").is_some() && patch.get("rdx").is_some() {
            return Err(SimulationError::ConflictingSpacing);
        }
        for (name, value) in patch.iter() {
            self.set(name, value)?;
        }
        Ok(())
    }

    /// Default values with the runtime and structural settings of `self`
    /// carried over (time, grid spacing, boundary and solver schedules)
    ///
    /// Used when switching scenarios so one preset's knobs never leak into the
    /// next.
    #[must_use]
    pub fn rebased(&self) -> Self {
        Self {
            dt: self.dt,
            t: self.t,
            dt_max: self.dt_max,
            dx: self.dx,
            rdx: self.rdx,
            enclosed: self.enclosed,
            pressure_iterations: self.pressure_iterations,
            coarse_iterations: self.coarse_iterations,
            ..Self::default()
        }
    }

    /// Boundary mode selected by the `enclosed` flag
    pub const fn boundary(&self) -> Boundary {
        Boundary::from_flag(self.enclosed)
    }

    /// Clamp a requested timestep into `[DT_MIN, dt_max]`
    ///
    /// A NaN request maps to `DT_MIN`.
    pub fn clamp_dt(&self, requested: f32) -> f32 {
        if requested.is_nan() {
            return DT_MIN;
        }
        requested.clamp(DT_MIN, self.dt_max.max(DT_MIN))
    }

    /// Raw bytes for uploading into a uniform buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Partial update of the uniform block, keyed by uniform name
///
/// Serialises as a plain map, so presets and UI state can be stored as
/// `{"smoke_decay": 0.2, "buoyancy": 4.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniformPatch {
    values: FxHashMap<String, f32>,
}

impl UniformPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: f32) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace a value
    pub fn set(&mut self, name: &str, value: f32) {
        self.values.insert(name.to_string(), value);
    }

    /// Value for `name`, if present
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    /// Add every entry of `other`, replacing existing values
    pub fn merge(&mut self, other: &UniformPatch) {
        self.values
            .extend(other.values.iter().map(|(k, v)| (k.clone(), *v)));
    }

    /// Names present in this patch
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Entries of this patch
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the patch is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for UniformPatch {
    fn from_iter<I: IntoIterator<Item = (S, f32)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
