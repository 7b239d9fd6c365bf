//! Smoke Simulation Core Library
//!
//! A real-time, grid-based incompressible fluid solver for stylised smoke,
//! fire and vortex effects. Every frame advances a dense 3D voxel grid through
//! a fixed pipeline of parallel stages: emission, semi-Lagrangian advection,
//! divergence, pressure projection, gradient subtraction and optional
//! vorticity confinement.
//!
//! The solver only evolves and exposes field data (velocity, smoke,
//! temperature, pressure); rendering is left to the caller.
//!
//! # Example
//! ```
//! use smoke_sim_core::{SimulationConfig, SmokeSimulation, StepOptions};
//!
//! let config = SimulationConfig {
//!     scenario: Some("fire-jet".to_string()),
//!     ..SimulationConfig::with_size(16, 24, 16)
//! };
//! let mut sim = SmokeSimulation::new(&config)?;
//! for _ in 0..10 {
//!     sim.step(1.0 / 60.0, StepOptions::default());
//! }
//! assert!(sim.stats().is_finite());
//! assert_eq!(sim.smoke().len(), 16 * 24 * 16);
//! # Ok::<(), smoke_sim_core::SimulationError>(())
//! ```

// Core types and utilities
pub mod core_types;
pub mod error;

// Field storage, kernels and orchestration
pub mod grid;
pub mod scenario;
pub mod simulation;
pub mod solver;

// Re-export core types
pub use core_types::{Vec3, Vec4};
pub use error::{Result, SimulationError};

// Re-export grid types
pub use grid::{Boundary, DoubleBuffer, Field, FieldView, GridDims};

// Re-export solver and simulation types
pub use scenario::{Scenario, DEFAULT_SCENARIO};
pub use simulation::{SimulationConfig, SimulationStats, SmokeSimulation, StepOptions};
pub use solver::{
    create_fluid_solver, BrushStroke, CpuFluidSolver, EmitterKind, FluidSolver, PressureSolver,
    UniformPatch, Uniforms, DT_MIN,
};
