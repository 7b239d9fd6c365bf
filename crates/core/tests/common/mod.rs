#![allow(dead_code)]

use smoke_sim_core::solver::divergence_at;
use smoke_sim_core::{Boundary, GridDims, SmokeSimulation, Vec4};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Radial outflow `(p - c) * exp(-|p - c|² / 2σ²)`, negligible at the faces
pub fn gaussian_blob(dims: &GridDims, sigma: f32) -> impl Fn(usize, usize, usize) -> Vec4 + Sync {
    let c = [
        (dims.width as f32 - 1.0) * 0.5,
        (dims.height as f32 - 1.0) * 0.5,
        (dims.depth as f32 - 1.0) * 0.5,
    ];
    move |x, y, z| {
        let r = [x as f32 - c[0], y as f32 - c[1], z as f32 - c[2]];
        let g = (-(r[0] * r[0] + r[1] * r[1] + r[2] * r[2]) / (2.0 * sigma * sigma)).exp();
        Vec4::new(r[0] * g, r[1] * g, r[2] * g, 0.0)
    }
}

/// Recompute the divergence of the current velocity for every cell
pub fn recompute_divergence(sim: &SmokeSimulation) -> Vec<f32> {
    let dims = sim.dims();
    let velocity = sim.velocity();
    let boundary = sim.uniforms().boundary();
    let half_rdx = 0.5 * sim.uniforms().rdx;
    (0..dims.total())
        .map(|i| {
            let (x, y, z) = dims.coords(i);
            divergence_at(&velocity, &dims, x, y, z, boundary, half_rdx)
        })
        .collect()
}

/// L2 norm of the divergence over cells at least `margin` cells from any face
pub fn interior_divergence(sim: &SmokeSimulation, margin: usize) -> f32 {
    let dims = sim.dims();
    let divergence = recompute_divergence(sim);
    divergence
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let (x, y, z) = dims.coords(*i);
            x >= margin
                && y >= margin
                && z >= margin
                && x + margin < dims.width
                && y + margin < dims.height
                && z + margin < dims.depth
        })
        .map(|(_, d)| d * d)
        .sum::<f32>()
        .sqrt()
}

/// Whether the cell lies on any face of the domain
pub fn on_border(dims: &GridDims, index: usize) -> bool {
    let (x, y, z) = dims.coords(index);
    dims.is_border(x, y, z)
}

pub fn open() -> Option<Boundary> {
    Some(Boundary::Open)
}
