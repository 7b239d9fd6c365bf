//! Fluid solver trait definition
//!
//! This module defines the `FluidSolver` trait, the backend-agnostic interface
//! to the per-stage kernels. The orchestrator owns the uniform block and the
//! step schedule; a backend owns the fields and runs one stage per call.

use super::emit::EmitterKind;
use super::pressure::PressureSolver;
use super::uniforms::Uniforms;
use crate::core_types::Vec4;
use crate::grid::GridDims;
use std::borrow::Cow;

/// Per-cell initialiser for a field, called with `(x, y, z)`
pub type CellFn<'a, T> = &'a (dyn Fn(usize, usize, usize) -> T + Sync);

/// Backend-agnostic interface for the smoke solver
///
/// Each method runs one stage over the whole grid and returns once every cell
/// has been written, so calls are strictly ordered. Stages that produce a new
/// full state of a double-buffered field swap that field before returning.
pub trait FluidSolver: Send + Sync {
    /// Add emitter contributions into the current velocity, smoke and
    /// temperature buffers (in place)
    fn emit(&mut self, kind: EmitterKind, uniforms: &Uniforms);

    /// Semi-Lagrangian advection with decay, combustion and buoyancy
    ///
    /// Swaps velocity, smoke and temperature; decays pressure in place.
    fn advect(&mut self, uniforms: &Uniforms);

    /// Recompute the divergence field and clear the current pressure
    fn compute_divergence(&mut self, uniforms: &Uniforms);

    /// Run `iterations` pressure iterations with the selected schedule
    ///
    /// Zero iterations leave pressure untouched.
    fn relax_pressure(&mut self, uniforms: &Uniforms, iterations: u32);

    /// Subtract the pressure gradient from the current velocity (in place)
    fn subtract_gradient(&mut self, uniforms: &Uniforms);

    /// Recompute the vorticity magnitude field
    fn compute_vorticity(&mut self, uniforms: &Uniforms);

    /// Apply the confinement force; swaps velocity
    fn confine_vorticity(&mut self, uniforms: &Uniforms);

    /// Overwrite the current velocity buffer cell by cell
    fn seed_velocity(&mut self, init: CellFn<'_, Vec4>);

    /// Overwrite the current smoke buffer cell by cell
    fn seed_smoke(&mut self, init: CellFn<'_, Vec4>);

    /// Overwrite the current temperature buffer cell by cell
    fn seed_temperature(&mut self, init: CellFn<'_, f32>);

    /// Zero every field (both buffers of double-buffered ones)
    fn clear(&mut self);

    /// Current velocity, `(x, y, z, fuel)` per cell
    ///
    /// CPU backend returns a borrowed slice, device backends an owned copy.
    fn read_velocity(&self) -> Cow<'_, [Vec4]>;

    /// Current smoke, `(r, g, b, density)` per cell
    fn read_smoke(&self) -> Cow<'_, [Vec4]>;

    /// Current temperature
    fn read_temperature(&self) -> Cow<'_, [f32]>;

    /// Current pressure
    fn read_pressure(&self) -> Cow<'_, [f32]>;

    /// Divergence from the last divergence stage
    fn read_divergence(&self) -> Cow<'_, [f32]>;

    /// Vorticity magnitude from the last vorticity stage
    fn read_vorticity(&self) -> Cow<'_, [f32]>;

    /// Selected pressure schedule
    fn pressure_solver(&self) -> PressureSolver;

    /// Select a pressure schedule, allocating any storage it needs
    fn set_pressure_solver(&mut self, solver: PressureSolver);

    /// Grid dimensions
    fn dimensions(&self) -> GridDims;

    /// Check if this solver is using GPU acceleration
    fn is_gpu_accelerated(&self) -> bool;
}
