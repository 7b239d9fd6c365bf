//! Stencil and addressing utilities shared by every kernel
//!
//! Neighbour lookups take signed coordinates so kernels can ask for the cell at
//! `x - 1` without special-casing the border. Out-of-range coordinates are
//! clamped to the nearest edge cell. Under [`Boundary::Enclosed`] a vector
//! fetched through a clamped axis has that axis' component negated, which makes
//! the ghost cell behind a wall mirror the flow and approximates a no-flow wall.

use super::GridDims;
use crate::core_types::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

/// Behaviour of the domain faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Boundary {
    /// Fluid leaves the domain freely; ghost cells copy the edge cell
    #[default]
    Open,
    /// Walls on all six faces; ghost cells reflect the face-normal component
    Enclosed,
}

impl Boundary {
    /// Decode the `enclosed` uniform flag
    pub const fn from_flag(enclosed: u32) -> Self {
        if enclosed == 0 {
            Self::Open
        } else {
            Self::Enclosed
        }
    }

    /// Encode as the `enclosed` uniform flag
    pub const fn flag(self) -> u32 {
        match self {
            Self::Open => 0,
            Self::Enclosed => 1,
        }
    }
}

/// Edge-clamped scalar lookup
#[inline]
pub fn fetch_scalar(field: &[f32], dims: &GridDims, x: isize, y: isize, z: isize) -> f32 {
    let (cx, cy, cz) = dims.clamp(x, y, z);
    field[dims.index(cx, cy, cz)]
}

/// Edge-clamped vector lookup with optional wall reflection
///
/// Only the x, y and z channels are ever reflected; the fourth channel (fuel or
/// density) passes through unchanged.
#[inline]
pub fn fetch_vector(
    field: &[Vec4],
    dims: &GridDims,
    x: isize,
    y: isize,
    z: isize,
    boundary: Boundary,
) -> Vec4 {
    let (cx, cy, cz) = dims.clamp(x, y, z);
    let mut v = field[dims.index(cx, cy, cz)];
    if boundary == Boundary::Enclosed {
        if cx as isize != x {
            v.x = -v.x;
        }
        if cy as isize != y {
            v.y = -v.y;
        }
        if cz as isize != z {
            v.z = -v.z;
        }
    }
    v
}

/// Undivided central differences of a scalar field: `(r - l, u - d, f - b)`
///
/// Callers scale by `0.5 * rdx` to get the gradient.
#[inline]
pub fn central_difference(field: &[f32], dims: &GridDims, x: usize, y: usize, z: usize) -> Vec3 {
    let (x, y, z) = (x as isize, y as isize, z as isize);
    Vec3::new(
        fetch_scalar(field, dims, x + 1, y, z) - fetch_scalar(field, dims, x - 1, y, z),
        fetch_scalar(field, dims, x, y + 1, z) - fetch_scalar(field, dims, x, y - 1, z),
        fetch_scalar(field, dims, x, y, z + 1) - fetch_scalar(field, dims, x, y, z - 1),
    )
}

/// Sum of the six face neighbours of a scalar field (edge-clamped)
#[inline]
pub fn neighbour_sum(field: &[f32], dims: &GridDims, x: usize, y: usize, z: usize) -> f32 {
    let (x, y, z) = (x as isize, y as isize, z as isize);
    fetch_scalar(field, dims, x - 1, y, z)
        + fetch_scalar(field, dims, x + 1, y, z)
        + fetch_scalar(field, dims, x, y - 1, z)
        + fetch_scalar(field, dims, x, y + 1, z)
        + fetch_scalar(field, dims, x, y, z - 1)
        + fetch_scalar(field, dims, x, y, z + 1)
}

/// Trilinear interpolation of a scalar field at a fractional cell position
#[inline]
pub fn sample_scalar(field: &[f32], dims: &GridDims, pos: Vec3) -> f32 {
    trilinear(field, dims, pos)
}

/// Trilinear interpolation of a vector field at a fractional cell position
#[inline]
pub fn sample_vector(field: &[Vec4], dims: &GridDims, pos: Vec3) -> Vec4 {
    trilinear(field, dims, pos)
}

struct AxisSample {
    lo: usize,
    hi: usize,
    t: f32,
}

#[inline]
fn axis_sample(p: f32, n: usize) -> AxisSample {
    let p = p.clamp(0.0, (n - 1) as f32);
    let lo = p.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    AxisSample {
        lo,
        hi,
        t: p - lo as f32,
    }
}

/// Fetch the 8 lattice samples around `pos` and blend them
fn trilinear<T>(field: &[T], dims: &GridDims, pos: Vec3) -> T
where
    T: Copy + Add<Output = T> + Mul<f32, Output = T>,
{
    let sx = axis_sample(pos.x, dims.width);
    let sy = axis_sample(pos.y, dims.height);
    let sz = axis_sample(pos.z, dims.depth);

    let at = |x: usize, y: usize, z: usize| field[dims.index(x, y, z)];

    let c00 = at(sx.lo, sy.lo, sz.lo) * (1.0 - sx.t) + at(sx.hi, sy.lo, sz.lo) * sx.t;
    let c10 = at(sx.lo, sy.hi, sz.lo) * (1.0 - sx.t) + at(sx.hi, sy.hi, sz.lo) * sx.t;
    let c01 = at(sx.lo, sy.lo, sz.hi) * (1.0 - sx.t) + at(sx.hi, sy.lo, sz.hi) * sx.t;
    let c11 = at(sx.lo, sy.hi, sz.hi) * (1.0 - sx.t) + at(sx.hi, sy.hi, sz.hi) * sx.t;

    let c0 = c00 * (1.0 - sy.t) + c10 * sy.t;
    let c1 = c01 * (1.0 - sy.t) + c11 * sy.t;

    c0 * (1.0 - sz.t) + c1 * sz.t
}
