//! Vector type aliases for positions and four-channel cell values.

use nalgebra::{Vector3, Vector4};

/// 3D vector type for positions and directions.
///
/// Solver positions are in cell units. Scenario and brush positions are
/// normalised to `[0, 1]` per axis.
pub type Vec3 = Vector3<f32>;

/// Four-channel cell value.
///
/// Velocity cells store `(x, y, z, fuel)`; smoke cells store
/// `(r, g, b, density)`.
pub type Vec4 = Vector4<f32>;
