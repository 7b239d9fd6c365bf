//! Pressure Poisson relaxation
//!
//! Solves `∇²p = div` on the cell grid with edge-clamped (zero normal
//! gradient) ghost cells. Three schedules share the same discrete equation:
//!
//! - **Jacobi**: `p' = (Σ neighbours + α·div) / 6`, `α = -dx²`, one ping-pong
//!   pass per iteration.
//! - **Red-black**: each iteration is a red half-sweep followed by a black one.
//!   A half-sweep updates cells of one parity and copies the rest, so black
//!   cells see the fresh red values.
//! - **Multigrid**: a two-level cycle. Jacobi pre-smoothing, residual
//!   restriction onto a grid coarsened by two, Jacobi on the coarse error
//!   equation with spacing `2·dx`, trilinear prolongation of the correction,
//!   then Jacobi post-smoothing.
//!
//! Pressure always starts from zero each step; the divergence stage clears it.

use super::dispatch::{dispatch, dispatch_in_place};
use super::uniforms::Uniforms;
use crate::core_types::Vec3;
use crate::grid::stencil::{neighbour_sum, sample_scalar};
use crate::grid::{DoubleBuffer, Field, GridDims};
use serde::{Deserialize, Serialize};

/// Iteration schedule of the pressure solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PressureSolver {
    /// Plain Jacobi relaxation
    #[default]
    Jacobi,
    /// Red-black ordered relaxation
    RedBlack,
    /// Two-level coarse-grid correction; needs `coarse_iterations > 0`
    Multigrid,
}

impl PressureSolver {
    /// Parse the kebab-case name used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jacobi" => Some(Self::Jacobi),
            "red-black" => Some(Self::RedBlack),
            "multigrid" => Some(Self::Multigrid),
            _ => None,
        }
    }

    /// Kebab-case name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jacobi => "jacobi",
            Self::RedBlack => "red-black",
            Self::Multigrid => "multigrid",
        }
    }
}

/// Cell colour for red-black ordering
#[inline]
fn parity(x: usize, y: usize, z: usize) -> usize {
    (x + y + z) & 1
}

/// One Jacobi pass: `out = (Σ neighbours(p) + alpha * rhs) / 6`
pub fn jacobi_pass_cpu(dims: &GridDims, alpha: f32, p: &[f32], rhs: &[f32], out: &mut [f32]) {
    dispatch(dims, out, |x, y, z| {
        (neighbour_sum(p, dims, x, y, z) + alpha * rhs[dims.index(x, y, z)]) / 6.0
    });
}

/// One red-black half-sweep: relax cells of `colour`, copy the others
pub fn red_black_pass_cpu(
    dims: &GridDims,
    alpha: f32,
    colour: usize,
    p: &[f32],
    rhs: &[f32],
    out: &mut [f32],
) {
    dispatch(dims, out, |x, y, z| {
        let i = dims.index(x, y, z);
        if parity(x, y, z) == colour {
            (neighbour_sum(p, dims, x, y, z) + alpha * rhs[i]) / 6.0
        } else {
            p[i]
        }
    });
}

/// Residual of the fine equation: `r = div - (Σ neighbours - 6p) / dx²`
pub fn residual_cpu(dims: &GridDims, dx: f32, p: &[f32], rhs: &[f32], out: &mut [f32]) {
    let inv_dx2 = 1.0 / (dx * dx);
    dispatch(dims, out, |x, y, z| {
        let i = dims.index(x, y, z);
        rhs[i] - (neighbour_sum(p, dims, x, y, z) - 6.0 * p[i]) * inv_dx2
    });
}

/// Average each 2×2×2 block of `fine` into one coarse cell
///
/// On odd-sized axes the last coarse cell averages the cells that exist.
pub fn restrict_cpu(fine_dims: &GridDims, fine: &[f32], coarse_dims: &GridDims, coarse: &mut [f32]) {
    dispatch(coarse_dims, coarse, |cx, cy, cz| {
        let mut sum = 0.0;
        let mut count = 0_u32;
        for z in (2 * cz)..(2 * cz + 2).min(fine_dims.depth) {
            for y in (2 * cy)..(2 * cy + 2).min(fine_dims.height) {
                for x in (2 * cx)..(2 * cx + 2).min(fine_dims.width) {
                    sum += fine[fine_dims.index(x, y, z)];
                    count += 1;
                }
            }
        }
        sum / count as f32
    });
}

/// Interpolate the coarse correction trilinearly and add it to `fine`
pub fn prolong_add_cpu(coarse_dims: &GridDims, coarse: &[f32], fine_dims: &GridDims, fine: &mut [f32]) {
    dispatch_in_place(fine_dims, fine, |x, y, z, p| {
        let pos = Vec3::new(
            (x as f32 - 0.5) * 0.5,
            (y as f32 - 0.5) * 0.5,
            (z as f32 - 0.5) * 0.5,
        );
        *p += sample_scalar(coarse, coarse_dims, pos);
    });
}

/// Storage for the two-level solve
#[derive(Debug, Clone)]
pub struct CoarseLevel {
    dims: GridDims,
    fine_residual: Field<f32>,
    rhs: Field<f32>,
    error: DoubleBuffer<f32>,
}

impl CoarseLevel {
    /// Allocate the coarse level for a fine grid of `fine_dims`
    pub fn new(fine_dims: GridDims) -> Self {
        let dims = fine_dims.coarsened();
        Self {
            dims,
            fine_residual: Field::new(fine_dims),
            rhs: Field::new(dims),
            error: DoubleBuffer::new(dims),
        }
    }

    /// Dimensions of the coarse grid
    pub fn dims(&self) -> GridDims {
        self.dims
    }
}

/// `iterations` Jacobi passes on `pressure`, swapping after each
pub fn relax_jacobi_cpu(u: &Uniforms, iterations: u32, pressure: &mut DoubleBuffer<f32>, divergence: &[f32]) {
    let dims = pressure.dims();
    let alpha = -(u.dx * u.dx);
    for _ in 0..iterations {
        let (p, out) = pressure.split();
        jacobi_pass_cpu(&dims, alpha, p, divergence, out);
        pressure.swap();
    }
}

/// `iterations` red-black iterations, two half-sweeps (and swaps) each
pub fn relax_red_black_cpu(
    u: &Uniforms,
    iterations: u32,
    pressure: &mut DoubleBuffer<f32>,
    divergence: &[f32],
) {
    let dims = pressure.dims();
    let alpha = -(u.dx * u.dx);
    for _ in 0..iterations {
        for colour in [0, 1] {
            let (p, out) = pressure.split();
            red_black_pass_cpu(&dims, alpha, colour, p, divergence, out);
            pressure.swap();
        }
    }
}

/// One two-level cycle spending `iterations` fine Jacobi passes
pub fn relax_multigrid_cpu(
    u: &Uniforms,
    iterations: u32,
    pressure: &mut DoubleBuffer<f32>,
    divergence: &[f32],
    level: &mut CoarseLevel,
) {
    let fine_dims = pressure.dims();
    let pre = iterations / 2;
    let post = iterations - pre;

    relax_jacobi_cpu(u, pre, pressure, divergence);

    residual_cpu(
        &fine_dims,
        u.dx,
        pressure.read(),
        divergence,
        level.fine_residual.as_mut_slice(),
    );
    restrict_cpu(
        &fine_dims,
        level.fine_residual.as_slice(),
        &level.dims,
        level.rhs.as_mut_slice(),
    );

    let coarse_dx = 2.0 * u.dx;
    let coarse_alpha = -(coarse_dx * coarse_dx);
    level.error.fill(0.0);
    for _ in 0..u.coarse_iterations {
        let (e, out) = level.error.split();
        jacobi_pass_cpu(&level.dims, coarse_alpha, e, level.rhs.as_slice(), out);
        level.error.swap();
    }

    prolong_add_cpu(&level.dims, level.error.read(), &fine_dims, pressure.read_mut());

    relax_jacobi_cpu(u, post, pressure, divergence);
}
