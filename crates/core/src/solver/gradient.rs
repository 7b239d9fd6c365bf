//! Projection onto the divergence-free part of the velocity field

use super::dispatch::dispatch_in_place;
use super::uniforms::Uniforms;
use crate::core_types::Vec4;
use crate::grid::stencil::central_difference;
use crate::grid::GridDims;

/// `v -= 0.5 * rdx * ∇p`, in place on the current velocity buffer
///
/// Each cell reads only pressure and its own velocity, so no second velocity
/// buffer is needed. The fourth (fuel) channel is left alone.
pub fn step_subtract_gradient_cpu(u: &Uniforms, dims: &GridDims, pressure: &[f32], velocity: &mut [Vec4]) {
    let scale = 0.5 * u.rdx;
    dispatch_in_place(dims, velocity, |x, y, z, v| {
        let grad = central_difference(pressure, dims, x, y, z) * scale;
        v.x -= grad.x;
        v.y -= grad.y;
        v.z -= grad.z;
    });
}
