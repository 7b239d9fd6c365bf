//! Velocity divergence
//!
//! Central differences over the six face neighbours, scaled by `0.5 * rdx`.
//! Neighbours outside the domain come from [`fetch_vector`], so under an
//! enclosed boundary the face-normal component behind a wall is reflected and
//! flow into the wall shows up as divergence the pressure solve will cancel.

use super::dispatch::dispatch;
use super::uniforms::Uniforms;
use crate::core_types::Vec4;
use crate::grid::stencil::fetch_vector;
use crate::grid::{Boundary, GridDims};

/// Divergence of `velocity` at one cell
#[inline]
pub fn divergence_at(
    velocity: &[Vec4],
    dims: &GridDims,
    x: usize,
    y: usize,
    z: usize,
    boundary: Boundary,
    half_rdx: f32,
) -> f32 {
    let (x, y, z) = (x as isize, y as isize, z as isize);
    let at = |dx: isize, dy: isize, dz: isize| fetch_vector(velocity, dims, x + dx, y + dy, z + dz, boundary);
    let ddx = at(1, 0, 0).x - at(-1, 0, 0).x;
    let ddy = at(0, 1, 0).y - at(0, -1, 0).y;
    let ddz = at(0, 0, 1).z - at(0, 0, -1).z;
    (ddx + ddy + ddz) * half_rdx
}

/// Write the divergence of `velocity` and clear the current pressure
pub fn step_divergence_cpu(
    u: &Uniforms,
    dims: &GridDims,
    velocity: &[Vec4],
    divergence: &mut [f32],
    pressure: &mut [f32],
) {
    let boundary = u.boundary();
    let half_rdx = 0.5 * u.rdx;
    dispatch(dims, divergence, |x, y, z| {
        divergence_at(velocity, dims, x, y, z, boundary, half_rdx)
    });
    pressure.fill(0.0);
}
