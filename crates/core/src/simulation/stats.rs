//! Field diagnostics

use crate::core_types::Vec4;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of aggregate field values
///
/// Computed on demand; stepping never scans the fields for these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Accumulated simulation time (s)
    pub time: f32,
    /// Steps taken since construction or the last reset
    pub steps: u64,
    /// Sum of smoke density over all cells
    pub total_smoke: f32,
    /// Largest temperature of any cell
    pub max_temperature: f32,
    /// Largest velocity magnitude of any cell (cells/s)
    pub max_speed: f32,
    /// Largest absolute divergence from the last divergence stage
    pub max_divergence: f32,
    /// Cells holding NaN or infinity in any field
    pub non_finite_cells: usize,
    /// Wall time of the last step (ms)
    pub last_step_ms: f64,
}

fn max_of(values: impl ParallelIterator<Item = f32>) -> f32 {
    values.reduce(|| 0.0, f32::max)
}

fn vec4_finite(v: &Vec4) -> bool {
    v.iter().all(|c| c.is_finite())
}

impl SimulationStats {
    /// Scan the current fields
    pub(crate) fn collect(
        velocity: &[Vec4],
        smoke: &[Vec4],
        temperature: &[f32],
        divergence: &[f32],
    ) -> Self {
        let total_smoke = smoke.par_iter().map(|s| s.w).sum::<f32>();
        let max_temperature = temperature.par_iter().copied().reduce(|| f32::NEG_INFINITY, f32::max);
        let max_speed = max_of(velocity.par_iter().map(|v| v.xyz().norm()));
        let max_divergence = max_of(divergence.par_iter().map(|d| d.abs()));
        let non_finite_cells = velocity
            .par_iter()
            .zip(smoke.par_iter())
            .zip(temperature.par_iter())
            .filter(|((v, s), t)| !(vec4_finite(v) && vec4_finite(s) && t.is_finite()))
            .count();

        Self {
            total_smoke,
            max_temperature,
            max_speed,
            max_divergence,
            non_finite_cells,
            ..Self::default()
        }
    }

    /// Whether every cell holds finite values
    pub fn is_finite(&self) -> bool {
        self.non_finite_cells == 0
    }
}

impl fmt::Display for SimulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {:>5} t={:>7.3}s smoke={:>10.3} max_T={:>7.3} max|v|={:>7.3} max|div|={:.2e} non_finite={} ({:.2} ms)",
            self.steps,
            self.time,
            self.total_smoke,
            self.max_temperature,
            self.max_speed,
            self.max_divergence,
            self.non_finite_cells,
            self.last_step_ms
        )
    }
}
