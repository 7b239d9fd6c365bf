//! Error types for smoke-sim-core.

use thiserror::Error;

/// Configuration errors raised while building or reconfiguring a simulation.
///
/// Every variant is returned synchronously by the call that received the bad
/// configuration. Numerical blow-up (NaNs, runaway velocities) is never
/// reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// A grid axis had zero cells.
    #[error("grid dimension {axis} must be positive, got {value}")]
    InvalidDimension { axis: char, value: usize },

    /// No built-in scenario has this name.
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),

    /// No uniform has this name.
    #[error("unknown uniform '{0}'")]
    UnknownUniform(String),

    /// The two-level pressure solver was selected without a coarse schedule.
    #[error("multigrid pressure solver requires coarse_iterations > 0")]
    MissingCoarseSchedule,

    /// A uniform patch set both `dx` and `rdx`.
    #[error("uniform patch sets both dx and rdx")]
    ConflictingSpacing,
}

/// A specialized Result type for smoke-sim-core operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
