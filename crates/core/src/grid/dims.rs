//! Grid dimensions and index flattening
//!
//! Cells are stored in a flat array with `x` varying fastest, then `y`, then `z`:
//! `index = (z * height + y) * width + x`. One row of `width` cells is therefore
//! contiguous, which is the unit of work handed to each parallel task.

use crate::core_types::Vec3;
use crate::error::{Result, SimulationError};

/// Dimensions of a dense 3D voxel grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    /// Cells along x
    pub width: usize,
    /// Cells along y (the buoyancy axis)
    pub height: usize,
    /// Cells along z
    pub depth: usize,
}

impl GridDims {
    /// Create grid dimensions, rejecting any zero-sized axis
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidDimension`] naming the first empty axis.
    pub fn new(width: usize, height: usize, depth: usize) -> Result<Self> {
        for (axis, value) in [('x', width), ('y', height), ('z', depth)] {
            if value == 0 {
                return Err(SimulationError::InvalidDimension { axis, value });
            }
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    /// Total number of cells
    #[inline]
    pub const fn total(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Flattened index of cell `(x, y, z)`
    #[inline]
    pub const fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Inverse of [`GridDims::index`]
    #[inline]
    pub const fn coords(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.width;
        let row = index / self.width;
        (x, row % self.height, row / self.height)
    }

    /// Whether the cell lies on any of the six faces of the domain
    #[inline]
    pub const fn is_border(&self, x: usize, y: usize, z: usize) -> bool {
        x == 0
            || y == 0
            || z == 0
            || x + 1 == self.width
            || y + 1 == self.height
            || z + 1 == self.depth
    }

    /// Clamp signed coordinates into the valid range (edge-clamp addressing)
    #[inline]
    pub fn clamp(&self, x: isize, y: isize, z: isize) -> (usize, usize, usize) {
        (
            clamp_axis(x, self.width),
            clamp_axis(y, self.height),
            clamp_axis(z, self.depth),
        )
    }

    /// Dimensions of the grid coarsened by two on every axis (rounded up)
    pub const fn coarsened(&self) -> Self {
        Self {
            width: self.width.div_ceil(2),
            height: self.height.div_ceil(2),
            depth: self.depth.div_ceil(2),
        }
    }

    /// Smallest axis length, used to scale emitter radii
    pub fn min_axis(&self) -> usize {
        self.width.min(self.height).min(self.depth)
    }

    /// Domain size in cell units, used to map normalised positions to cells
    pub fn extent(&self) -> Vec3 {
        Vec3::new(self.width as f32, self.height as f32, self.depth as f32)
    }

    /// Map a normalised domain position onto the sampling lattice
    ///
    /// Cell `i` is sampled at `i` and covers `[i - 0.5, i + 0.5]`, so the
    /// domain spans `[-0.5, n - 0.5]` on each axis.
    pub fn to_lattice(&self, normalised: Vec3) -> Vec3 {
        normalised.component_mul(&self.extent()).add_scalar(-0.5)
    }
}

#[inline]
fn clamp_axis(v: isize, n: usize) -> usize {
    v.clamp(0, n as isize - 1) as usize
}
