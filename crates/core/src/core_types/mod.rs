//! Core math types shared by the grid, solver and scenario layers.

pub mod vector;

pub use vector::{Vec3, Vec4};
