//! Semi-Lagrangian advection with decay, combustion and buoyancy
//!
//! # Per-cell update
//!
//! ```text
//! pos   = cell - dt * rdx * v(cell)
//! v'    = sample(v, pos) * exp(-velocity_decay * dt)      (fuel: fuel_decay)
//! s'    = sample(s, pos) * exp(-smoke_decay * dt)
//! T'    = sample(T, pos) * exp(-temperature_decay * dt)
//! if T' > ignition:  burned = min(burn_rate * dt, fuel)
//!                    fuel -= burned, T' += burned * burn_heat_emit,
//!                    s' += tint * burned * burn_smoke_emit
//! v'.y += buoyancy * T' * dt
//! ```
//!
//! With an open boundary a back-trace landing outside `[-0.5, n - 0.5]` on any
//! axis zeroes the cell: the fluid it would have carried has left the domain.

use super::dispatch::dispatch3;
use super::uniforms::Uniforms;
use crate::core_types::{Vec3, Vec4};
use crate::grid::stencil::{sample_scalar, sample_vector};
use crate::grid::{Boundary, GridDims};

/// Per-step decay factors, hoisted out of the per-cell kernel
#[derive(Debug, Clone, Copy)]
struct Decay {
    velocity: f32,
    fuel: f32,
    smoke: f32,
    temperature: f32,
}

impl Decay {
    fn new(u: &Uniforms) -> Self {
        let factor = |rate: f32| (-rate * u.dt).exp();
        Self {
            velocity: factor(u.velocity_decay),
            fuel: factor(u.fuel_decay),
            smoke: factor(u.smoke_decay),
            temperature: factor(u.temperature_decay),
        }
    }
}

#[inline]
fn outside(pos: Vec3, dims: &GridDims) -> bool {
    let lies_outside = |p: f32, n: usize| p < -0.5 || p > n as f32 - 0.5;
    lies_outside(pos.x, dims.width) || lies_outside(pos.y, dims.height) || lies_outside(pos.z, dims.depth)
}

/// Advect velocity, smoke and temperature from the read buffers into the
/// write buffers
#[allow(clippy::too_many_arguments)]
pub fn step_advect_cpu(
    u: &Uniforms,
    dims: &GridDims,
    velocity_in: &[Vec4],
    smoke_in: &[Vec4],
    temperature_in: &[f32],
    velocity_out: &mut [Vec4],
    smoke_out: &mut [Vec4],
    temperature_out: &mut [f32],
) {
    let decay = Decay::new(u);
    let trace = u.dt * u.rdx;
    let open = u.boundary() == Boundary::Open;
    let tint = Vec4::new(u.burn_smoke_r, u.burn_smoke_g, u.burn_smoke_b, 1.0);
    let burn_limit = u.burn_rate * u.dt;

    dispatch3(dims, velocity_out, smoke_out, temperature_out, |x, y, z| {
        let here = velocity_in[dims.index(x, y, z)];
        let pos = Vec3::new(x as f32, y as f32, z as f32) - here.xyz() * trace;
        if open && outside(pos, dims) {
            return (Vec4::zeros(), Vec4::zeros(), 0.0);
        }

        let mut v = sample_vector(velocity_in, dims, pos);
        let mut s = sample_vector(smoke_in, dims, pos) * decay.smoke;
        let mut t = sample_scalar(temperature_in, dims, pos) * decay.temperature;

        v.x *= decay.velocity;
        v.y *= decay.velocity;
        v.z *= decay.velocity;
        v.w *= decay.fuel;

        if t > u.ignition_temperature {
            let burned = burn_limit.min(v.w).max(0.0);
            v.w -= burned;
            t += burned * u.burn_heat_emit;
            s += tint * (burned * u.burn_smoke_emit);
        }

        v.y += u.buoyancy * t * u.dt;
        (v, s, t)
    });
}

/// Multiply the current pressure by its decay factor
pub fn decay_pressure_cpu(u: &Uniforms, pressure: &mut [f32]) {
    let factor = (-u.pressure_decay * u.dt).exp();
    for p in pressure.iter_mut() {
        *p *= factor;
    }
}
