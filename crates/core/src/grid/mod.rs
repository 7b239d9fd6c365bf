//! Grid field storage and addressing
//!
//! - [`GridDims`]: index flattening and coordinate helpers
//! - [`Field`] / [`DoubleBuffer`]: dense per-cell storage, single or ping-pong
//! - [`stencil`]: boundary-aware neighbour lookups and trilinear resampling

mod dims;
mod field;
pub mod stencil;

pub use dims::GridDims;
pub use field::{DoubleBuffer, Field, FieldElement, FieldView};
pub use stencil::Boundary;
