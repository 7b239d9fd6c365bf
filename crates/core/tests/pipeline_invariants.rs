mod common;

use common::{gaussian_blob, on_border};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smoke_sim_core::{
    Boundary, Scenario, SimulationConfig, SmokeSimulation, StepOptions, UniformPatch, Vec4,
};

fn random_sim(size: usize, seed: u64) -> SmokeSimulation {
    let mut sim = SmokeSimulation::new(&SimulationConfig::with_size(size, size, size)).unwrap();
    let dims = sim.dims();

    let mut rng = StdRng::seed_from_u64(seed);
    let velocity: Vec<Vec4> = (0..dims.total())
        .map(|_| {
            Vec4::new(
                rng.random_range(-5.0..5.0),
                rng.random_range(-5.0..5.0),
                rng.random_range(-5.0..5.0),
                rng.random_range(0.0..1.0),
            )
        })
        .collect();
    let smoke: Vec<Vec4> = (0..dims.total())
        .map(|_| {
            Vec4::new(
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(0.0..1.0),
            )
        })
        .collect();
    let temperature: Vec<f32> = (0..dims.total()).map(|_| rng.random_range(0.0..2.0)).collect();

    sim.seed_velocity(|x, y, z| velocity[dims.index(x, y, z)]);
    sim.seed_smoke(|x, y, z| smoke[dims.index(x, y, z)]);
    sim.seed_temperature(|x, y, z| temperature[dims.index(x, y, z)]);
    sim
}

#[test]
fn test_smoke_and_temperature_stay_non_negative() {
    let mut sim = random_sim(16, 7);

    for _ in 0..50 {
        sim.step(1.0 / 30.0, StepOptions::without_emitters());
    }

    assert!(sim.stats().is_finite());
    for s in sim.smoke().iter() {
        assert!(s.iter().all(|&c| c >= 0.0), "negative smoke {s:?}");
    }
    assert!(sim.temperature().iter().all(|&t| t >= 0.0));
}

#[test]
fn test_fuel_never_goes_negative_while_burning() {
    let mut sim = random_sim(12, 11);
    sim.set_scenario("fire-jet").unwrap();

    for _ in 0..40 {
        sim.step(1.0 / 60.0, StepOptions::default());
    }

    assert!(sim.velocity().iter().all(|v| v.w >= 0.0));
}

#[test]
fn test_velocity_buffers_alternate_with_each_advect() {
    let mut sim = SmokeSimulation::new(&SimulationConfig::with_size(6, 6, 6)).unwrap();
    let initial = sim.velocity().as_ptr();
    let initial_smoke = sim.smoke().as_ptr();

    sim.advect();
    assert_ne!(sim.velocity().as_ptr(), initial);
    assert_ne!(sim.smoke().as_ptr(), initial_smoke);

    sim.advect();
    assert_eq!(sim.velocity().as_ptr(), initial);
    assert_eq!(sim.smoke().as_ptr(), initial_smoke);

    for _ in 0..3 {
        sim.advect();
    }
    assert_ne!(sim.velocity().as_ptr(), initial);
}

#[test]
fn test_emitters_never_write_the_border() {
    for name in Scenario::names() {
        let config = SimulationConfig {
            scenario: Some(name.to_string()),
            ..SimulationConfig::with_size(4, 4, 4)
        };
        let mut sim = SmokeSimulation::new(&config).unwrap();
        sim.update_uniforms(
            &UniformPatch::new()
                .with("emit_y", 0.5)
                .with("emit_radius", 0.5)
                .with("brush_radius", 0.5),
        )
        .unwrap();
        sim.move_brush(smoke_sim_core::Vec3::new(0.4, 0.5, 0.5));
        sim.move_brush(smoke_sim_core::Vec3::new(0.6, 0.5, 0.5));
        sim.emit();

        let dims = sim.dims();
        let velocity = sim.velocity();
        let smoke = sim.smoke();
        let temperature = sim.temperature();
        for i in 0..dims.total() {
            if on_border(&dims, i) {
                assert_eq!(velocity[i], Vec4::zeros(), "{name}: velocity at {:?}", dims.coords(i));
                assert_eq!(smoke[i], Vec4::zeros(), "{name}: smoke at {:?}", dims.coords(i));
                assert_eq!(temperature[i], 0.0, "{name}: temperature at {:?}", dims.coords(i));
            }
        }
    }
}

#[test]
fn test_enclosed_walls_push_back_normal_flow() {
    let config = SimulationConfig {
        boundary: Some(Boundary::Enclosed),
        pressure_iterations: Some(200),
        vorticity: Some(false),
        ..SimulationConfig::with_size(8, 8, 8)
    };
    let mut sim = SmokeSimulation::new(&config).unwrap();
    sim.seed_velocity(|_, _, _| Vec4::new(1.0, 0.0, 0.0, 0.0));
    sim.project();

    let dims = sim.dims();
    // Divergence is kept from before the solve: the ghost behind each x wall
    // carries the reflected component.
    let divergence = sim.divergence();
    approx::assert_relative_eq!(divergence[dims.index(dims.width - 1, 3, 3)], -1.0);
    approx::assert_relative_eq!(divergence[dims.index(0, 3, 3)], 1.0);
    assert_eq!(divergence[dims.index(3, 3, 3)], 0.0);

    let velocity = sim.velocity();
    let mut wall = 0.0;
    let mut interior = 0.0_f32;
    for z in 0..dims.depth {
        for y in 0..dims.height {
            wall += velocity.get(dims.width - 1, y, z).x;
            for x in 2..dims.width - 2 {
                interior = interior.max(velocity.get(x, y, z).x.abs());
            }
        }
    }
    wall /= (dims.height * dims.depth) as f32;

    assert!(wall < 0.75, "wall-normal velocity {wall}");
    assert!(interior < 0.25, "interior velocity {interior}");
}

#[test]
fn test_open_boundary_lets_uniform_flow_through() {
    let config = SimulationConfig {
        boundary: Some(Boundary::Open),
        pressure_iterations: Some(50),
        vorticity: Some(false),
        ..SimulationConfig::with_size(8, 8, 8)
    };
    let mut sim = SmokeSimulation::new(&config).unwrap();
    sim.seed_velocity(|_, _, _| Vec4::new(1.0, 0.0, 0.0, 0.0));
    sim.project();

    assert!(sim.divergence().iter().all(|&d| d == 0.0));
    assert!(sim.velocity().iter().all(|v| v.x == 1.0));
}

#[test]
fn test_boundary_switch_applies_to_next_projection() {
    let config = SimulationConfig {
        boundary: Some(Boundary::Open),
        vorticity: Some(false),
        ..SimulationConfig::with_size(8, 8, 8)
    };
    let mut sim = SmokeSimulation::new(&config).unwrap();
    sim.seed_velocity(|_, _, _| Vec4::new(1.0, 0.0, 0.0, 0.0));
    sim.compute_divergence();
    assert!(sim.divergence().iter().all(|&d| d == 0.0));

    sim.set_boundary(Boundary::Enclosed);
    assert_eq!(sim.uniforms().boundary(), Boundary::Enclosed);
    sim.compute_divergence();

    let dims = sim.dims();
    let divergence = sim.divergence();
    for z in 0..dims.depth {
        for y in 0..dims.height {
            approx::assert_relative_eq!(divergence.get(0, y, z), 1.0);
            approx::assert_relative_eq!(divergence.get(dims.width - 1, y, z), -1.0);
        }
    }
    assert_eq!(divergence.get(3, 3, 3), 0.0);
}

#[test]
fn test_disabled_vorticity_leaves_magnitude_field_alone() {
    let mut sim = SmokeSimulation::new(&SimulationConfig::with_size(10, 10, 10)).unwrap();
    assert!(sim.vorticity_enabled());
    let c = 4.5;
    sim.seed_velocity(|x, y, _| Vec4::new(-(y as f32 - c) * 0.5, (x as f32 - c) * 0.5, 0.0, 0.0));
    sim.step(1.0 / 60.0, StepOptions::without_emitters());

    let magnitude = sim.vorticity().to_vec();
    assert!(magnitude.iter().any(|&w| w > 0.0));

    sim.set_vorticity_enabled(false);
    assert!(!sim.vorticity_enabled());
    sim.step(1.0 / 60.0, StepOptions::without_emitters());
    assert_eq!(sim.vorticity().to_vec(), magnitude);
}

#[test]
fn test_identical_runs_match_exactly() {
    let run = || {
        let mut sim = SmokeSimulation::new(&SimulationConfig {
            scenario: Some("vortex-chamber".to_string()),
            ..SimulationConfig::with_size(12, 16, 12)
        })
        .unwrap();
        let dims = sim.dims();
        sim.seed_velocity(gaussian_blob(&dims, 2.0));
        for _ in 0..15 {
            sim.step(1.0 / 60.0, StepOptions::default());
        }
        (
            sim.velocity().to_vec(),
            sim.smoke().to_vec(),
            sim.temperature().to_vec(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_every_scenario_runs_and_stays_finite() {
    for name in Scenario::names() {
        let config = SimulationConfig {
            scenario: Some(name.to_string()),
            ..SimulationConfig::with_size(16, 16, 16)
        };
        let mut sim = SmokeSimulation::new(&config).unwrap();
        for _ in 0..30 {
            sim.step(1.0 / 60.0, StepOptions::default());
        }

        let stats = sim.stats();
        assert!(stats.is_finite(), "{name}: {stats}");
        assert_eq!(stats.steps, 30);
        if *name != "brush" {
            assert!(stats.total_smoke > 0.0, "{name} emitted nothing");
        }
    }
}
