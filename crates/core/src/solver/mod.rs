//! Grid-based smoke and fire solver
//!
//! The solver advances a dense 3D voxel grid through a fixed pipeline of
//! per-cell kernels: emit, advect, divergence, pressure relaxation, gradient
//! subtraction and optional vorticity confinement. Each kernel is a pure
//! function of its input buffers dispatched over the whole grid.
//!
//! The core abstraction is the `FluidSolver` trait: one method per stage,
//! backed by a CPU implementation that dispatches rows of cells with Rayon.
//!
//! # Example
//!
//! ```rust,ignore
//! use smoke_sim_core::grid::GridDims;
//! use smoke_sim_core::solver::{create_fluid_solver, PressureSolver, Uniforms};
//!
//! let dims = GridDims::new(32, 48, 32)?;
//! let mut solver = create_fluid_solver(dims, PressureSolver::Jacobi);
//! let uniforms = Uniforms::default();
//! solver.advect(&uniforms);
//! ```

mod advect;
mod brush;
mod cpu;
pub mod dispatch;
mod divergence;
mod emit;
mod gradient;
pub mod pressure;
pub mod profiler;
#[allow(clippy::module_name_repetitions)]
mod r#trait;
mod uniforms;
pub mod vorticity;

// Re-exports
pub use brush::BrushStroke;
pub use cpu::CpuFluidSolver;
pub use divergence::divergence_at;
pub use emit::EmitterKind;
pub use pressure::{CoarseLevel, PressureSolver};
pub use profiler::{FrameTimer, ProfilerScope};
pub use r#trait::{CellFn, FluidSolver};
pub use uniforms::{UniformPatch, Uniforms, DT_MIN};

use crate::grid::GridDims;
use tracing::info;

/// Create a fluid solver for a grid of `dims`
///
/// Only the CPU backend ships today; the selection is logged so a run's
/// output records which backend produced it.
///
/// # Arguments
///
/// * `dims` - Grid dimensions
/// * `solver` - Pressure iteration schedule
///
/// # Returns
///
/// A boxed `FluidSolver` trait object
pub fn create_fluid_solver(dims: GridDims, solver: PressureSolver) -> Box<dyn FluidSolver> {
    info!(
        "Using CPU backend ({}x{}x{} grid, {} pressure solver, {} threads)",
        dims.width,
        dims.height,
        dims.depth,
        solver.name(),
        rayon::current_num_threads()
    );
    Box::new(CpuFluidSolver::new(dims, solver))
}
