//! Smoke simulation orchestrator
//!
//! `SmokeSimulation` owns the solver backend, the uniform block and the active
//! scenario, and sequences one frame as:
//!
//! 1. clamp `dt`, advance `t`
//! 2. emit (unless disabled for this step)
//! 3. advect (swaps velocity, smoke, temperature)
//! 4. divergence (clears pressure)
//! 5. `pressure_iterations` relaxation passes
//! 6. gradient subtraction
//! 7. vorticity magnitude and confinement, when enabled
//!
//! Construction allocates every field up front and validates the whole
//! configuration, so a constructed simulation is always ready to step.

mod config;
mod stats;

pub use config::{SimulationConfig, StepOptions};
pub use stats::SimulationStats;

use crate::core_types::{Vec3, Vec4};
use crate::error::{Result, SimulationError};
use crate::grid::{Boundary, FieldView, GridDims};
use crate::scenario::{Scenario, DEFAULT_SCENARIO};
use crate::solver::{
    create_fluid_solver, BrushStroke, FluidSolver, FrameTimer, PressureSolver, UniformPatch,
    Uniforms,
};
use std::time::Instant;
use tracing::{debug, info, warn};

fn check_coarse_schedule(solver: PressureSolver, uniforms: &Uniforms) -> Result<()> {
    if solver == PressureSolver::Multigrid && uniforms.coarse_iterations == 0 {
        return Err(SimulationError::MissingCoarseSchedule);
    }
    Ok(())
}

/// Real-time smoke and fire simulation on a dense 3D grid
pub struct SmokeSimulation {
    /// Backend-agnostic fluid solver
    solver: Box<dyn FluidSolver>,

    /// Every tunable value, passed by reference into each stage
    uniforms: Uniforms,

    /// Active preset
    scenario: Scenario,
    vorticity_enabled: bool,

    /// Pointer state for the brush emitter
    brush: BrushStroke,

    /// Statistics
    timer: FrameTimer,
    steps: u64,

    /// Grid dimensions (cached from solver)
    dims: GridDims,
}

impl SmokeSimulation {
    /// Create a new simulation
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidDimension`] if any grid axis is zero
    /// - [`SimulationError::UnknownScenario`] for an unknown scenario name
    /// - [`SimulationError::UnknownUniform`] if the extra uniforms name an
    ///   unknown value
    /// - [`SimulationError::MissingCoarseSchedule`] for the multigrid solver
    ///   with `coarse_iterations == 0`
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        let dims = GridDims::new(config.width, config.height, config.depth)?;
        let scenario = Scenario::from_name(config.scenario.as_deref().unwrap_or(DEFAULT_SCENARIO))?;

        let mut uniforms = Uniforms::default();
        if let Some(boundary) = config.boundary {
            uniforms.enclosed = boundary.flag();
        }
        if let Some(iterations) = config.pressure_iterations {
            uniforms.pressure_iterations = iterations;
        }
        uniforms.apply(&scenario.overrides)?;
        uniforms.apply(&config.uniforms)?;
        check_coarse_schedule(config.pressure_solver, &uniforms)?;

        let vorticity_enabled = config.vorticity.unwrap_or(scenario.vorticity);
        let solver = create_fluid_solver(dims, config.pressure_solver);

        info!(
            "Smoke simulation initialized: {}x{}x{} grid, scenario={}, pressure={}x{}, vorticity={}, boundary={:?}, GPU={}",
            dims.width,
            dims.height,
            dims.depth,
            scenario.name,
            solver.pressure_solver().name(),
            uniforms.pressure_iterations,
            vorticity_enabled,
            uniforms.boundary(),
            solver.is_gpu_accelerated()
        );

        Ok(Self {
            solver,
            uniforms,
            scenario,
            vorticity_enabled,
            brush: BrushStroke::new(),
            timer: FrameTimer::new(),
            steps: 0,
            dims,
        })
    }

    /// Advance the simulation by one frame
    ///
    /// `dt` is clamped into `[DT_MIN, dt_max]` before use; a NaN request runs
    /// the shortest step.
    pub fn step(&mut self, dt: f32, options: StepOptions) {
        let start = Instant::now();

        let clamped = self.uniforms.clamp_dt(dt);
        if !dt.is_finite() {
            warn!(requested = dt, clamped, "Non-finite timestep requested");
        } else if clamped != dt {
            debug!(requested = dt, clamped, "Timestep clamped");
        }
        self.uniforms.dt = clamped;
        self.uniforms.t += clamped;

        if options.emitters {
            self.emit();
        }
        self.advect();
        self.compute_divergence();
        self.relax_pressure();
        self.subtract_gradient();
        if self.vorticity_enabled {
            self.compute_vorticity();
            self.confine_vorticity();
        }

        self.steps += 1;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.timer.record(elapsed_ms);
        debug!(
            step = self.steps,
            t = self.uniforms.t,
            dt = self.uniforms.dt,
            iterations = self.uniforms.pressure_iterations,
            elapsed_ms,
            "Step complete"
        );
    }

    /// Run the scenario's emitter with the current uniforms
    pub fn emit(&mut self) {
        self.solver.emit(self.scenario.emitter, &self.uniforms);
    }

    /// Advect velocity, smoke and temperature (swaps all three)
    pub fn advect(&mut self) {
        self.solver.advect(&self.uniforms);
    }

    /// Recompute divergence and clear pressure
    pub fn compute_divergence(&mut self) {
        self.solver.compute_divergence(&self.uniforms);
    }

    /// Run `pressure_iterations` relaxation passes
    pub fn relax_pressure(&mut self) {
        self.solver
            .relax_pressure(&self.uniforms, self.uniforms.pressure_iterations);
    }

    /// Subtract the pressure gradient from velocity
    pub fn subtract_gradient(&mut self) {
        self.solver.subtract_gradient(&self.uniforms);
    }

    /// Divergence, pressure relaxation and gradient subtraction
    pub fn project(&mut self) {
        self.compute_divergence();
        self.relax_pressure();
        self.subtract_gradient();
    }

    /// Recompute the vorticity magnitude field
    pub fn compute_vorticity(&mut self) {
        self.solver.compute_vorticity(&self.uniforms);
    }

    /// Apply vorticity confinement (swaps velocity)
    pub fn confine_vorticity(&mut self) {
        self.solver.confine_vorticity(&self.uniforms);
    }

    /// Switch to a built-in scenario
    ///
    /// Uniforms return to their defaults with the scenario's overrides on top;
    /// time, grid spacing, boundary and pressure schedule are kept. Fields and
    /// the vorticity toggle are left as they are; a scenario's vorticity
    /// default only applies at construction.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownScenario`] and changes nothing if the
    /// name is not a built-in.
    pub fn set_scenario(&mut self, name: &str) -> Result<()> {
        let scenario = Scenario::from_name(name)?;
        self.apply_scenario(scenario)
    }

    /// Switch to a caller-defined scenario
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownUniform`] and changes nothing if the
    /// overrides name an unknown uniform.
    pub fn apply_scenario(&mut self, scenario: Scenario) -> Result<()> {
        let mut uniforms = self.uniforms.rebased();
        uniforms.apply(&scenario.overrides)?;
        check_coarse_schedule(self.solver.pressure_solver(), &uniforms)?;

        info!("Scenario changed: {} -> {}", self.scenario.name, scenario.name);
        self.uniforms = uniforms;
        self.scenario = scenario;
        self.brush = BrushStroke::new();
        Ok(())
    }

    /// Merge a partial uniform update
    ///
    /// # Errors
    ///
    /// - [`SimulationError::UnknownUniform`] if any name is unknown
    /// - [`SimulationError::MissingCoarseSchedule`] if the update would leave
    ///   the multigrid solver without coarse iterations
    ///
    /// On error nothing is changed.
    pub fn update_uniforms(&mut self, patch: &UniformPatch) -> Result<()> {
        let mut uniforms = self.uniforms;
        uniforms.apply(patch)?;
        check_coarse_schedule(self.solver.pressure_solver(), &uniforms)?;
        debug!(changed = patch.len(), "Uniforms updated");
        self.uniforms = uniforms;
        Ok(())
    }

    /// Turn vorticity confinement on or off
    pub fn set_vorticity_enabled(&mut self, enabled: bool) {
        self.vorticity_enabled = enabled;
    }

    /// Switch the pressure iteration schedule
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::MissingCoarseSchedule`] when selecting the
    /// multigrid solver while `coarse_iterations` is zero.
    pub fn set_pressure_solver(&mut self, solver: PressureSolver) -> Result<()> {
        check_coarse_schedule(solver, &self.uniforms)?;
        info!("Pressure solver: {}", solver.name());
        self.solver.set_pressure_solver(solver);
        Ok(())
    }

    /// Set the face behaviour
    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.uniforms.enclosed = boundary.flag();
    }

    /// Overwrite the current velocity field, `(x, y, z, fuel)` per cell
    pub fn seed_velocity(&mut self, init: impl Fn(usize, usize, usize) -> Vec4 + Sync) {
        self.solver.seed_velocity(&init);
    }

    /// Overwrite the current smoke field, `(r, g, b, density)` per cell
    pub fn seed_smoke(&mut self, init: impl Fn(usize, usize, usize) -> Vec4 + Sync) {
        self.solver.seed_smoke(&init);
    }

    /// Overwrite the current temperature field
    pub fn seed_temperature(&mut self, init: impl Fn(usize, usize, usize) -> f32 + Sync) {
        self.solver.seed_temperature(&init);
    }

    /// Zero all fields, time and step count
    pub fn reset(&mut self) {
        self.solver.clear();
        self.uniforms.t = 0.0;
        self.steps = 0;
        self.timer.reset();
        self.brush.release(&mut self.uniforms);
        info!("Simulation reset");
    }

    /// Feed a pointer sample (normalised domain coordinates) to the brush
    pub fn move_brush(&mut self, position: Vec3) {
        let dt = self.uniforms.dt;
        self.brush.update(position, dt, &self.dims, &mut self.uniforms);
    }

    /// Lift the brush
    pub fn release_brush(&mut self) {
        self.brush.release(&mut self.uniforms);
    }

    /// Aggregate diagnostics over the current fields
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            time: self.uniforms.t,
            steps: self.steps,
            last_step_ms: self.timer.last_frame_time_ms(),
            ..SimulationStats::collect(
                &self.solver.read_velocity(),
                &self.solver.read_smoke(),
                &self.solver.read_temperature(),
                &self.solver.read_divergence(),
            )
        }
    }

    /// Release every buffer
    pub fn dispose(self) {
        info!(
            "Disposing smoke simulation after {} steps ({:.3}s simulated, {:.2} ms/step)",
            self.steps,
            self.uniforms.t,
            self.timer.average_frame_time_ms()
        );
    }

    /// Current velocity: `(x, y, z, fuel)` per cell
    pub fn velocity(&self) -> FieldView<'_, Vec4> {
        FieldView::new(self.solver.read_velocity(), self.dims)
    }

    /// Current smoke: `(r, g, b, density)` per cell
    pub fn smoke(&self) -> FieldView<'_, Vec4> {
        FieldView::new(self.solver.read_smoke(), self.dims)
    }

    /// Current temperature
    pub fn temperature(&self) -> FieldView<'_, f32> {
        FieldView::new(self.solver.read_temperature(), self.dims)
    }

    /// Current pressure
    pub fn pressure(&self) -> FieldView<'_, f32> {
        FieldView::new(self.solver.read_pressure(), self.dims)
    }

    /// Divergence computed by the last divergence stage
    pub fn divergence(&self) -> FieldView<'_, f32> {
        FieldView::new(self.solver.read_divergence(), self.dims)
    }

    /// Vorticity magnitude computed by the last vorticity stage
    pub fn vorticity(&self) -> FieldView<'_, f32> {
        FieldView::new(self.solver.read_vorticity(), self.dims)
    }

    /// Uniform block
    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    /// Active scenario
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Grid dimensions
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Accumulated simulation time (s)
    pub fn time(&self) -> f32 {
        self.uniforms.t
    }

    /// Steps taken since construction or the last reset
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Whether vorticity confinement runs each step
    pub fn vorticity_enabled(&self) -> bool {
        self.vorticity_enabled
    }

    /// Active pressure iteration schedule
    pub fn pressure_solver(&self) -> PressureSolver {
        self.solver.pressure_solver()
    }

    /// Check if the solver is using GPU acceleration
    pub fn is_gpu_accelerated(&self) -> bool {
        self.solver.is_gpu_accelerated()
    }
}
