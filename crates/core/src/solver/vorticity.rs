//! Vorticity confinement
//!
//! Two passes. The first stores `|ω|` with `ω = ∇ × v`. The second pushes the
//! flow along `N × ω`, where `N` is the normalised gradient of `|ω|`, which
//! spins small vortices back up after advection has smeared them out.

use super::dispatch::dispatch;
use super::uniforms::Uniforms;
use crate::core_types::{Vec3, Vec4};
use crate::grid::stencil::{central_difference, fetch_vector};
use crate::grid::{Boundary, GridDims};

/// Below this gradient magnitude the confinement direction is undefined
const GRADIENT_EPSILON: f32 = 1.0e-5;

/// Curl of the velocity field at one cell
pub fn curl_at(
    velocity: &[Vec4],
    dims: &GridDims,
    x: usize,
    y: usize,
    z: usize,
    boundary: Boundary,
    half_rdx: f32,
) -> Vec3 {
    let (x, y, z) = (x as isize, y as isize, z as isize);
    let at = |dx: isize, dy: isize, dz: isize| fetch_vector(velocity, dims, x + dx, y + dy, z + dz, boundary);
    let (l, r) = (at(-1, 0, 0), at(1, 0, 0));
    let (d, u) = (at(0, -1, 0), at(0, 1, 0));
    let (b, f) = (at(0, 0, -1), at(0, 0, 1));
    Vec3::new(
        (u.z - d.z) - (f.y - b.y),
        (f.x - b.x) - (r.z - l.z),
        (r.y - l.y) - (u.x - d.x),
    ) * half_rdx
}

/// Write `|∇ × v|` for every cell
pub fn step_vorticity_magnitude_cpu(u: &Uniforms, dims: &GridDims, velocity: &[Vec4], magnitude: &mut [f32]) {
    let boundary = u.boundary();
    let half_rdx = 0.5 * u.rdx;
    dispatch(dims, magnitude, |x, y, z| {
        curl_at(velocity, dims, x, y, z, boundary, half_rdx).norm()
    });
}

/// Add `vorticity * dx * (N × ω) * dt` to every cell, reading `velocity_in`
/// and writing `velocity_out`
pub fn step_vorticity_confinement_cpu(
    u: &Uniforms,
    dims: &GridDims,
    magnitude: &[f32],
    velocity_in: &[Vec4],
    velocity_out: &mut [Vec4],
) {
    let boundary = u.boundary();
    let half_rdx = 0.5 * u.rdx;
    let scale = u.vorticity * u.dx * u.dt;

    dispatch(dims, velocity_out, |x, y, z| {
        let v = velocity_in[dims.index(x, y, z)];
        let grad = central_difference(magnitude, dims, x, y, z) * half_rdx;
        let len = grad.norm();
        if scale == 0.0 || len < GRADIENT_EPSILON {
            return v;
        }
        let n = grad / len;
        let omega = curl_at(velocity_in, dims, x, y, z, boundary, half_rdx);
        let force = n.cross(&omega) * scale;
        Vec4::new(v.x + force.x, v.y + force.y, v.z + force.z, v.w)
    });
}
