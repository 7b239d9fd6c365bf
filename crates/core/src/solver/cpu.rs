//! CPU-based fluid solver implementation
//!
//! This module provides a CPU implementation of the `FluidSolver` trait using
//! flat `Vec` arenas and Rayon for parallelism. Every stage is one parallel
//! pass over the grid rows.

use super::advect::{decay_pressure_cpu, step_advect_cpu};
use super::dispatch::dispatch;
use super::divergence::step_divergence_cpu;
use super::emit::{step_emit_cpu, EmitterKind};
use super::gradient::step_subtract_gradient_cpu;
use super::pressure::{
    relax_jacobi_cpu, relax_multigrid_cpu, relax_red_black_cpu, CoarseLevel, PressureSolver,
};
use super::profiler::ProfilerScope;
use super::r#trait::CellFn;
use super::uniforms::Uniforms;
use super::vorticity::{step_vorticity_confinement_cpu, step_vorticity_magnitude_cpu};
use super::FluidSolver;
use crate::core_types::Vec4;
use crate::grid::{DoubleBuffer, Field, FieldElement, GridDims};
use std::borrow::Cow;

fn seed<T: FieldElement>(dims: &GridDims, data: &mut [T], init: CellFn<'_, T>) {
    dispatch(dims, data, |x, y, z| init(x, y, z));
}

/// CPU-based fluid solver using Rayon for parallelism
///
/// State that a stage rewrites from a full read of its previous value is
/// double-buffered (velocity, smoke, temperature, pressure). Derived fields
/// recomputed from scratch each step are single-buffered.
pub struct CpuFluidSolver {
    // Ping-pong buffers (read current, write the other, then swap)
    velocity: DoubleBuffer<Vec4>,
    smoke: DoubleBuffer<Vec4>,
    temperature: DoubleBuffer<f32>,
    pressure: DoubleBuffer<f32>,

    // Derived fields
    divergence: Field<f32>,
    vorticity: Field<f32>,

    // Two-level pressure storage, present only for the multigrid schedule
    coarse: Option<CoarseLevel>,
    solver: PressureSolver,

    dims: GridDims,
}

impl CpuFluidSolver {
    /// Allocate every field for `dims`, zeroed
    pub fn new(dims: GridDims, solver: PressureSolver) -> Self {
        let coarse = (solver == PressureSolver::Multigrid).then(|| CoarseLevel::new(dims));
        Self {
            velocity: DoubleBuffer::new(dims),
            smoke: DoubleBuffer::new(dims),
            temperature: DoubleBuffer::new(dims),
            pressure: DoubleBuffer::new(dims),
            divergence: Field::new(dims),
            vorticity: Field::new(dims),
            coarse,
            solver,
            dims,
        }
    }
}

impl FluidSolver for CpuFluidSolver {
    fn emit(&mut self, kind: EmitterKind, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("emit");
        step_emit_cpu(
            kind,
            uniforms,
            &self.dims,
            self.velocity.read_mut(),
            self.smoke.read_mut(),
            self.temperature.read_mut(),
        );
    }

    fn advect(&mut self, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("advect");
        let (velocity_in, velocity_out) = self.velocity.split();
        let (smoke_in, smoke_out) = self.smoke.split();
        let (temperature_in, temperature_out) = self.temperature.split();
        step_advect_cpu(
            uniforms,
            &self.dims,
            velocity_in,
            smoke_in,
            temperature_in,
            velocity_out,
            smoke_out,
            temperature_out,
        );
        self.velocity.swap();
        self.smoke.swap();
        self.temperature.swap();

        decay_pressure_cpu(uniforms, self.pressure.read_mut());
    }

    fn compute_divergence(&mut self, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("divergence");
        step_divergence_cpu(
            uniforms,
            &self.dims,
            self.velocity.read(),
            self.divergence.as_mut_slice(),
            self.pressure.read_mut(),
        );
    }

    fn relax_pressure(&mut self, uniforms: &Uniforms, iterations: u32) {
        if iterations == 0 {
            return;
        }
        let _scope = ProfilerScope::new("pressure");
        let divergence = self.divergence.as_slice();
        match self.solver {
            PressureSolver::Jacobi => {
                relax_jacobi_cpu(uniforms, iterations, &mut self.pressure, divergence);
            }
            PressureSolver::RedBlack => {
                relax_red_black_cpu(uniforms, iterations, &mut self.pressure, divergence);
            }
            PressureSolver::Multigrid => {
                let dims = self.dims;
                let level = self.coarse.get_or_insert_with(|| CoarseLevel::new(dims));
                relax_multigrid_cpu(uniforms, iterations, &mut self.pressure, divergence, level);
            }
        }
    }

    fn subtract_gradient(&mut self, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("gradient");
        step_subtract_gradient_cpu(
            uniforms,
            &self.dims,
            self.pressure.read(),
            self.velocity.read_mut(),
        );
    }

    fn compute_vorticity(&mut self, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("vorticity");
        step_vorticity_magnitude_cpu(
            uniforms,
            &self.dims,
            self.velocity.read(),
            self.vorticity.as_mut_slice(),
        );
    }

    fn confine_vorticity(&mut self, uniforms: &Uniforms) {
        let _scope = ProfilerScope::new("confinement");
        let (velocity_in, velocity_out) = self.velocity.split();
        step_vorticity_confinement_cpu(
            uniforms,
            &self.dims,
            self.vorticity.as_slice(),
            velocity_in,
            velocity_out,
        );
        self.velocity.swap();
    }

    fn seed_velocity(&mut self, init: CellFn<'_, Vec4>) {
        seed(&self.dims, self.velocity.read_mut(), init);
    }

    fn seed_smoke(&mut self, init: CellFn<'_, Vec4>) {
        seed(&self.dims, self.smoke.read_mut(), init);
    }

    fn seed_temperature(&mut self, init: CellFn<'_, f32>) {
        seed(&self.dims, self.temperature.read_mut(), init);
    }

    fn clear(&mut self) {
        self.velocity.fill(Vec4::zeros());
        self.smoke.fill(Vec4::zeros());
        self.temperature.fill(0.0);
        self.pressure.fill(0.0);
        self.divergence.fill(0.0);
        self.vorticity.fill(0.0);
    }

    fn read_velocity(&self) -> Cow<'_, [Vec4]> {
        Cow::Borrowed(self.velocity.read())
    }

    fn read_smoke(&self) -> Cow<'_, [Vec4]> {
        Cow::Borrowed(self.smoke.read())
    }

    fn read_temperature(&self) -> Cow<'_, [f32]> {
        Cow::Borrowed(self.temperature.read())
    }

    fn read_pressure(&self) -> Cow<'_, [f32]> {
        Cow::Borrowed(self.pressure.read())
    }

    fn read_divergence(&self) -> Cow<'_, [f32]> {
        Cow::Borrowed(self.divergence.as_slice())
    }

    fn read_vorticity(&self) -> Cow<'_, [f32]> {
        Cow::Borrowed(self.vorticity.as_slice())
    }

    fn pressure_solver(&self) -> PressureSolver {
        self.solver
    }

    fn set_pressure_solver(&mut self, solver: PressureSolver) {
        if solver == PressureSolver::Multigrid && self.coarse.is_none() {
            self.coarse = Some(CoarseLevel::new(self.dims));
        }
        self.solver = solver;
    }

    fn dimensions(&self) -> GridDims {
        self.dims
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver(n: usize) -> CpuFluidSolver {
        CpuFluidSolver::new(GridDims::new(n, n, n).unwrap(), PressureSolver::Jacobi)
    }

    #[test]
    fn test_cpu_solver_creation() {
        let solver = solver(6);
        assert_eq!(solver.dimensions().total(), 216);
        assert_eq!(solver.read_velocity().len(), 216);
        assert_eq!(solver.read_smoke().len(), 216);
        assert!(solver.read_temperature().iter().all(|&t| t == 0.0));
        assert!(!solver.is_gpu_accelerated());
        assert!(solver.coarse.is_none());
    }

    #[test]
    fn test_seed_writes_current_buffers() {
        let mut solver = solver(4);
        let dims = solver.dimensions();
        solver.seed_temperature(&|x, _, _| x as f32);
        solver.seed_smoke(&|_, y, _| Vec4::new(0.0, 0.0, 0.0, y as f32));
        assert_eq!(solver.read_temperature()[dims.index(3, 0, 0)], 3.0);
        assert_eq!(solver.read_smoke()[dims.index(0, 2, 1)].w, 2.0);
    }

    #[test]
    fn test_advect_swaps_and_borrows_current_buffer() {
        let mut solver = solver(4);
        let uniforms = Uniforms::default();
        let first = solver.read_velocity().as_ptr();
        solver.advect(&uniforms);
        let second = solver.read_velocity().as_ptr();
        assert_ne!(first, second);
        solver.advect(&uniforms);
        assert_eq!(solver.read_velocity().as_ptr(), first);
    }

    #[test]
    fn test_zero_iterations_leave_pressure_alone() {
        let mut solver = solver(4);
        let uniforms = Uniforms::default();
        solver.seed_velocity(&|x, _, _| Vec4::new(x as f32, 0.0, 0.0, 0.0));
        solver.compute_divergence(&uniforms);
        let before = solver.read_pressure().as_ptr();
        solver.relax_pressure(&uniforms, 0);
        assert_eq!(solver.read_pressure().as_ptr(), before);
        assert!(solver.read_pressure().iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_multigrid_allocates_coarse_level() {
        let mut solver = solver(8);
        solver.set_pressure_solver(PressureSolver::Multigrid);
        assert_eq!(solver.pressure_solver(), PressureSolver::Multigrid);
        assert_eq!(solver.coarse.as_ref().map(CoarseLevel::dims), Some(GridDims::new(4, 4, 4).unwrap()));
    }

    #[test]
    fn test_clear_zeroes_everything() {
        let mut solver = solver(4);
        solver.seed_velocity(&|_, _, _| Vec4::new(1.0, 1.0, 1.0, 1.0));
        solver.seed_temperature(&|_, _, _| 5.0);
        solver.advect(&Uniforms::default());
        solver.clear();
        assert!(solver.read_velocity().iter().all(|v| *v == Vec4::zeros()));
        assert!(solver.read_temperature().iter().all(|&t| t == 0.0));
    }
}
