//! Interactive brush input
//!
//! Converts a stream of pointer positions into the brush segment and velocity
//! uniforms read by the brush emitter. Consecutive samples form the segment so
//! fast strokes leave a continuous trail instead of isolated blobs.

use super::uniforms::Uniforms;
use crate::core_types::Vec3;
use crate::grid::GridDims;

/// Pointer state between frames
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BrushStroke {
    last: Option<Vec3>,
}

impl BrushStroke {
    /// Create an idle stroke
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pointer is currently down
    pub fn is_active(&self) -> bool {
        self.last.is_some()
    }

    /// Record a pointer sample at normalised `position`
    ///
    /// The segment runs from the previous sample to this one; the first sample
    /// of a stroke is a point with zero velocity. Velocity is in cells per
    /// second.
    pub fn update(&mut self, position: Vec3, dt: f32, dims: &GridDims, u: &mut Uniforms) {
        let position = position.map(|c| c.clamp(0.0, 1.0));
        let start = self.last.unwrap_or(position);
        let velocity = if dt > 0.0 {
            (position - start).component_mul(&dims.extent()) / dt
        } else {
            Vec3::zeros()
        };

        u.brush_start_x = start.x;
        u.brush_start_y = start.y;
        u.brush_start_z = start.z;
        u.brush_end_x = position.x;
        u.brush_end_y = position.y;
        u.brush_end_z = position.z;
        u.brush_vel_x = velocity.x;
        u.brush_vel_y = velocity.y;
        u.brush_vel_z = velocity.z;
        u.brush_active = 1;

        self.last = Some(position);
    }

    /// End the stroke and switch the brush emitter off
    pub fn release(&mut self, u: &mut Uniforms) {
        self.last = None;
        u.brush_active = 0;
        u.brush_vel_x = 0.0;
        u.brush_vel_y = 0.0;
        u.brush_vel_z = 0.0;
    }
}
