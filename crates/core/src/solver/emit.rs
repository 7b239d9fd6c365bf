//! Emitter kernels
//!
//! Every emitter adds velocity, smoke, heat and fuel into the current buffers
//! in place. Contributions are weighted by a smooth falloff around the source
//! and scaled by `dt`, so the amount injected per simulated second does not
//! depend on the frame rate. The one-cell border is never touched.

use super::dispatch::dispatch3_in_place;
use super::uniforms::Uniforms;
use crate::core_types::{Vec3, Vec4};
use crate::grid::GridDims;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Tints of the five choreographed spheres
const SPHERE_PALETTE: [[f32; 3]; 5] = [
    [0.95, 0.35, 0.25],
    [0.95, 0.8, 0.3],
    [0.35, 0.85, 0.45],
    [0.3, 0.55, 0.95],
    [0.75, 0.4, 0.9],
];

/// Source shape selected by a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmitterKind {
    /// Smoke source whose outflow precesses around the vertical axis
    RotatingSmoke,
    /// Hot, fuel-laden jet circling the source position
    FireJet,
    /// Five spheres orbiting the domain centre, each with its own tint
    Spheres,
    /// Tangential swirl with radial inflow plus a rotating floor source
    VortexChamber,
    /// Line segment driven by pointer input
    Brush,
}

impl EmitterKind {
    /// Stable lower-case name
    pub const fn name(self) -> &'static str {
        match self {
            Self::RotatingSmoke => "rotating-smoke",
            Self::FireJet => "fire-jet",
            Self::Spheres => "spheres",
            Self::VortexChamber => "vortex-chamber",
            Self::Brush => "brush",
        }
    }
}

/// Smooth compact falloff: 1 at the centre, 0 at and beyond `radius`
#[inline]
fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    let q = 1.0 - (distance / radius).powi(2);
    q * q
}

#[inline]
fn add_xyz(v: &mut Vec4, d: Vec3) {
    v.x += d.x;
    v.y += d.y;
    v.z += d.z;
}

#[inline]
fn lattice_point(x: usize, y: usize, z: usize) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32)
}

/// Distance from `p` to the segment `a..b`
fn segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    let t = if len2 > 0.0 {
        ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).norm()
}

/// Resolved per-dispatch geometry, computed once instead of per cell
struct Source {
    centre: Vec3,
    radius: f32,
    angle: f32,
}

impl Source {
    fn new(u: &Uniforms, dims: &GridDims) -> Self {
        Self {
            centre: dims.to_lattice(Vec3::new(u.emit_x, u.emit_y, u.emit_z)),
            radius: u.emit_radius * dims.min_axis() as f32,
            angle: u.t * u.emit_spin,
        }
    }

    /// Outflow direction tilted away from +y and precessing with `angle`
    fn direction(&self, tilt: f32) -> Vec3 {
        Vec3::new(self.angle.cos() * tilt, 1.0, self.angle.sin() * tilt).normalize()
    }
}

#[inline]
fn emit_colour(u: &Uniforms) -> Vec4 {
    Vec4::new(u.emit_r, u.emit_g, u.emit_b, 1.0)
}

/// Add the contribution of `kind` into the current velocity, smoke and
/// temperature buffers
///
/// The brush is a no-op unless `brush_active` is set.
pub fn step_emit_cpu(
    kind: EmitterKind,
    u: &Uniforms,
    dims: &GridDims,
    velocity: &mut [Vec4],
    smoke: &mut [Vec4],
    temperature: &mut [f32],
) {
    let dt = u.dt;
    let source = Source::new(u, dims);

    match kind {
        EmitterKind::RotatingSmoke => {
            let dir = source.direction(0.35);
            let colour = emit_colour(u);
            dispatch3_in_place(dims, velocity, smoke, temperature, |x, y, z, v, s, t| {
                if dims.is_border(x, y, z) {
                    return;
                }
                let w = falloff((lattice_point(x, y, z) - source.centre).norm(), source.radius);
                if w == 0.0 {
                    return;
                }
                add_xyz(v, dir * (u.emit_speed * w * dt));
                *s += colour * (u.emit_smoke * w * dt);
                *t += u.emit_temperature * w * dt;
            });
        }
        EmitterKind::FireJet => {
            // The nozzle circles the source at half its radius
            let offset = Vec3::new(source.angle.cos(), 0.0, source.angle.sin()) * (0.5 * source.radius);
            let nozzle = source.centre + offset;
            let dir = source.direction(0.15);
            let colour = emit_colour(u);
            dispatch3_in_place(dims, velocity, smoke, temperature, |x, y, z, v, s, t| {
                if dims.is_border(x, y, z) {
                    return;
                }
                let w = falloff((lattice_point(x, y, z) - nozzle).norm(), source.radius);
                if w == 0.0 {
                    return;
                }
                add_xyz(v, dir * (u.emit_speed * w * dt));
                v.w += u.emit_fuel * w * dt;
                *s += colour * (u.emit_smoke * w * dt);
                *t += u.emit_temperature * w * dt;
            });
        }
        EmitterKind::Spheres => {
            let middle = dims.to_lattice(Vec3::new(0.5, u.emit_y, 0.5));
            let min_axis = dims.min_axis() as f32;
            let radius = u.sphere_radius * min_axis;
            let orbit = u.sphere_orbit * min_axis;
            let spheres: Vec<(Vec3, Vec3, Vec4)> = SPHERE_PALETTE
                .iter()
                .enumerate()
                .map(|(i, rgb)| {
                    let phase = u.t * u.sphere_speed + i as f32 * TAU / 5.0;
                    let bob = (u.t * u.sphere_speed * 2.0 + i as f32).sin() * 0.5 * radius;
                    let centre = middle + Vec3::new(orbit * phase.cos(), bob, orbit * phase.sin());
                    let tangent = Vec3::new(-phase.sin(), 0.3, phase.cos()).normalize();
                    (centre, tangent, Vec4::new(rgb[0], rgb[1], rgb[2], 1.0))
                })
                .collect();
            dispatch3_in_place(dims, velocity, smoke, temperature, |x, y, z, v, s, t| {
                if dims.is_border(x, y, z) {
                    return;
                }
                let p = lattice_point(x, y, z);
                for (centre, tangent, colour) in &spheres {
                    let w = falloff((p - centre).norm(), radius);
                    if w == 0.0 {
                        continue;
                    }
                    add_xyz(v, tangent * (u.emit_speed * w * dt));
                    *s += colour * (u.emit_smoke * w * dt);
                    *t += u.emit_temperature * w * dt;
                }
            });
        }
        EmitterKind::VortexChamber => {
            let axis = dims.to_lattice(Vec3::new(0.5, 0.5, 0.5));
            let (axis_x, axis_z) = (axis.x, axis.z);
            let chamber = 0.5 * dims.width.min(dims.depth) as f32;
            let dir = source.direction(0.35);
            let colour = emit_colour(u);
            dispatch3_in_place(dims, velocity, smoke, temperature, |x, y, z, v, s, t| {
                if dims.is_border(x, y, z) {
                    return;
                }
                let p = lattice_point(x, y, z);
                let (rx, rz) = (p.x - axis_x, p.z - axis_z);
                let rho = (rx * rx + rz * rz).sqrt();
                if rho > 1.0e-4 && rho < chamber {
                    let strength = rho / chamber;
                    let tangent = Vec3::new(-rz / rho, 0.0, rx / rho);
                    let inward = Vec3::new(-rx / rho, 0.0, -rz / rho);
                    add_xyz(
                        v,
                        (tangent * u.chamber_swirl + inward * u.chamber_inflow) * (strength * dt),
                    );
                }
                let w = falloff((p - source.centre).norm(), source.radius);
                if w > 0.0 {
                    add_xyz(v, dir * (u.emit_speed * w * dt));
                    *s += colour * (u.emit_smoke * w * dt);
                    *t += u.emit_temperature * w * dt;
                }
            });
        }
        EmitterKind::Brush => {
            if u.brush_active == 0 {
                return;
            }
            let a = dims.to_lattice(Vec3::new(u.brush_start_x, u.brush_start_y, u.brush_start_z));
            let b = dims.to_lattice(Vec3::new(u.brush_end_x, u.brush_end_y, u.brush_end_z));
            let radius = u.brush_radius * dims.min_axis() as f32;
            let push = Vec3::new(u.brush_vel_x, u.brush_vel_y, u.brush_vel_z) * u.brush_strength;
            let colour = emit_colour(u);
            dispatch3_in_place(dims, velocity, smoke, temperature, |x, y, z, v, s, t| {
                if dims.is_border(x, y, z) {
                    return;
                }
                let w = falloff(segment_distance(lattice_point(x, y, z), a, b), radius);
                if w == 0.0 {
                    return;
                }
                add_xyz(v, push * (w * dt));
                v.w += u.brush_fuel * w * dt;
                *s += colour * (u.brush_smoke * w * dt);
                *t += u.brush_temperature * w * dt;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [EmitterKind; 5] = [
        EmitterKind::RotatingSmoke,
        EmitterKind::FireJet,
        EmitterKind::Spheres,
        EmitterKind::VortexChamber,
        EmitterKind::Brush,
    ];

    struct Buffers {
        velocity: Vec<Vec4>,
        smoke: Vec<Vec4>,
        temperature: Vec<f32>,
    }

    impl Buffers {
        fn new(dims: &GridDims) -> Self {
            Self {
                velocity: vec![Vec4::zeros(); dims.total()],
                smoke: vec![Vec4::zeros(); dims.total()],
                temperature: vec![0.0; dims.total()],
            }
        }

        fn emit(&mut self, kind: EmitterKind, u: &Uniforms, dims: &GridDims) {
            step_emit_cpu(
                kind,
                u,
                dims,
                &mut self.velocity,
                &mut self.smoke,
                &mut self.temperature,
            );
        }
    }

    fn covering_uniforms() -> Uniforms {
        Uniforms {
            emit_y: 0.5,
            emit_radius: 0.5,
            emit_fuel: 1.0,
            sphere_radius: 0.5,
            sphere_orbit: 0.0,
            brush_active: 1,
            brush_start_x: 0.2,
            brush_end_x: 0.8,
            brush_radius: 0.5,
            brush_vel_x: 10.0,
            ..Uniforms::default()
        }
    }

    #[test]
    fn test_falloff_profile() {
        assert_eq!(falloff(0.0, 2.0), 1.0);
        assert_eq!(falloff(2.0, 2.0), 0.0);
        assert_eq!(falloff(3.0, 2.0), 0.0);
        assert_eq!(falloff(1.0, 0.0), 0.0);
        assert!(falloff(1.0, 2.0) > 0.0 && falloff(1.0, 2.0) < 1.0);
    }

    #[test]
    fn test_segment_distance() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(4.0, 0.0, 0.0);
        assert_relative_eq!(segment_distance(Vec3::new(2.0, 3.0, 0.0), a, b), 3.0);
        assert_relative_eq!(segment_distance(Vec3::new(-3.0, 0.0, 4.0), a, b), 5.0);
        assert_relative_eq!(segment_distance(Vec3::new(1.0, 1.0, 0.0), a, a), 2.0_f32.sqrt());
    }

    #[test]
    fn test_every_emitter_skips_the_border() {
        let dims = GridDims::new(6, 6, 6).unwrap();
        let u = covering_uniforms();
        for kind in ALL {
            let mut buffers = Buffers::new(&dims);
            buffers.emit(kind, &u, &dims);

            let mut touched_interior = false;
            for i in 0..dims.total() {
                let (x, y, z) = dims.coords(i);
                let changed = buffers.velocity[i] != Vec4::zeros()
                    || buffers.smoke[i] != Vec4::zeros()
                    || buffers.temperature[i] != 0.0;
                if dims.is_border(x, y, z) {
                    assert!(!changed, "{} wrote border cell {:?}", kind.name(), (x, y, z));
                } else {
                    touched_interior |= changed;
                }
            }
            assert!(touched_interior, "{} emitted nothing", kind.name());
        }
    }

    #[test]
    fn test_emission_scales_with_dt() {
        let dims = GridDims::new(8, 8, 8).unwrap();
        let mut u = covering_uniforms();

        let mut once = Buffers::new(&dims);
        u.dt = 0.02;
        once.emit(EmitterKind::RotatingSmoke, &u, &dims);

        let mut twice = Buffers::new(&dims);
        u.dt = 0.01;
        twice.emit(EmitterKind::RotatingSmoke, &u, &dims);
        twice.emit(EmitterKind::RotatingSmoke, &u, &dims);

        for i in 0..dims.total() {
            assert_relative_eq!(once.smoke[i].w, twice.smoke[i].w, epsilon = 1e-6);
            assert_relative_eq!(once.temperature[i], twice.temperature[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_source_peaks_on_its_lattice_cell() {
        let dims = GridDims::new(8, 8, 8).unwrap();
        let u = Uniforms {
            emit_x: 3.5 / 8.0,
            emit_y: 4.5 / 8.0,
            emit_z: 3.5 / 8.0,
            emit_radius: 0.25,
            emit_spin: 0.0,
            dt: 0.02,
            ..Uniforms::default()
        };
        let mut buffers = Buffers::new(&dims);
        buffers.emit(EmitterKind::RotatingSmoke, &u, &dims);

        let peak = buffers.smoke[dims.index(3, 4, 3)].w;
        assert_relative_eq!(peak, u.emit_smoke * u.dt, max_relative = 1e-6);
        assert_relative_eq!(
            buffers.smoke[dims.index(2, 4, 3)].w,
            buffers.smoke[dims.index(4, 4, 3)].w
        );
        assert!(buffers.smoke.iter().all(|s| s.w <= peak));
    }

    #[test]
    fn test_inactive_brush_is_a_no_op() {
        let dims = GridDims::new(6, 6, 6).unwrap();
        let u = Uniforms {
            brush_active: 0,
            ..covering_uniforms()
        };
        let mut buffers = Buffers::new(&dims);
        buffers.emit(EmitterKind::Brush, &u, &dims);
        assert!(buffers.smoke.iter().all(|s| *s == Vec4::zeros()));
    }

    #[test]
    fn test_fire_jet_stores_fuel() {
        let dims = GridDims::new(8, 8, 8).unwrap();
        let mut buffers = Buffers::new(&dims);
        buffers.emit(EmitterKind::FireJet, &covering_uniforms(), &dims);
        assert!(buffers.velocity.iter().any(|v| v.w > 0.0));
        assert!(buffers.velocity.iter().all(|v| v.w >= 0.0));
    }

    #[test]
    fn test_vortex_chamber_swirls_about_vertical_axis() {
        let dims = GridDims::new(10, 10, 10).unwrap();
        let u = Uniforms {
            emit_smoke: 0.0,
            emit_radius: 0.0,
            chamber_inflow: 0.0,
            ..Uniforms::default()
        };
        let mut buffers = Buffers::new(&dims);
        buffers.emit(EmitterKind::VortexChamber, &u, &dims);

        // +x of the axis flows toward +z, -x flows toward -z
        let east = buffers.velocity[dims.index(7, 5, 5)];
        let west = buffers.velocity[dims.index(2, 5, 5)];
        assert!(east.z > 0.0);
        assert!(west.z < 0.0);
        assert_eq!(east.y, 0.0);
    }
}
