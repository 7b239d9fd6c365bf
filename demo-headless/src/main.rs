use clap::Parser;
use smoke_sim_core::{
    Boundary, PressureSolver, Scenario, SimulationConfig, SmokeSimulation, StepOptions, Vec3,
    Vec4,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Headless smoke simulation runner
#[derive(Parser, Debug)]
#[command(name = "smoke-sim-demo")]
#[command(about = "Grid smoke and fire simulation demo", long_about = None)]
struct Args {
    /// Scenario (smoke-column, fire-jet, spheres, vortex-chamber, brush)
    #[arg(short, long, default_value = "smoke-column")]
    scenario: String,

    /// Grid size as WIDTHxHEIGHTxDEPTH
    #[arg(long, default_value = "48x64x48", value_parser = parse_size)]
    size: (usize, usize, usize),

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 240)]
    frames: u32,

    /// Timestep per frame in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Pressure relaxation passes per frame
    #[arg(short, long)]
    pressure_iterations: Option<u32>,

    /// Pressure solver (jacobi, red-black, multigrid)
    #[arg(long, default_value = "jacobi")]
    solver: String,

    /// Use enclosed walls instead of open faces
    #[arg(long)]
    enclosed: bool,

    /// Disable vorticity confinement
    #[arg(long)]
    no_vorticity: bool,

    /// Report interval in frames
    #[arg(short, long, default_value_t = 30)]
    report_every: u32,

    /// Run validation checks instead of a scenario
    #[arg(short, long)]
    validate: bool,
}

fn parse_size(s: &str) -> Result<(usize, usize, usize), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("expected WIDTHxHEIGHTxDEPTH, got '{s}'"));
    }
    let mut axes = [0usize; 3];
    for (axis, part) in axes.iter_mut().zip(&parts) {
        *axis = part
            .trim()
            .parse()
            .map_err(|e| format!("bad axis '{part}': {e}"))?;
    }
    Ok((axes[0], axes[1], axes[2]))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.validate {
        run_validation_checks();
        return;
    }

    let Some(solver) = PressureSolver::from_name(&args.solver) else {
        error!("Unknown pressure solver '{}'", args.solver);
        std::process::exit(2);
    };

    let (width, height, depth) = args.size;
    let config = SimulationConfig {
        scenario: Some(args.scenario.clone()),
        pressure_iterations: args.pressure_iterations,
        vorticity: args.no_vorticity.then_some(false),
        pressure_solver: solver,
        boundary: Some(if args.enclosed {
            Boundary::Enclosed
        } else {
            Boundary::Open
        }),
        ..SimulationConfig::with_size(width, height, depth)
    };

    let mut sim = match SmokeSimulation::new(&config) {
        Ok(sim) => sim,
        Err(e) => {
            error!("Failed to create simulation: {e}");
            std::process::exit(1);
        }
    };

    println!("=== Smoke Simulation Demo ===\n");
    println!(
        "Grid: {}x{}x{}, scenario: {}, solver: {} x{}, vorticity: {}",
        width,
        height,
        depth,
        sim.scenario().name,
        sim.pressure_solver().name(),
        sim.uniforms().pressure_iterations,
        sim.vorticity_enabled()
    );
    println!("Available scenarios: {}\n", Scenario::names().join(", "));

    println!("Frame | Time(s) | Smoke      | Max T   | Max |v|  | Max |div| | ms/step");
    println!("------|---------|------------|---------|----------|-----------|--------");

    let brush = sim.scenario().name == "brush";
    let report_every = args.report_every.max(1);
    for frame in 1..=args.frames {
        if brush {
            // Sweep the brush in a circle through the middle of the domain.
            let angle = frame as f32 * 0.05;
            sim.move_brush(Vec3::new(
                0.5 + 0.25 * angle.cos(),
                0.4,
                0.5 + 0.25 * angle.sin(),
            ));
        }
        sim.step(args.dt, StepOptions::default());

        if frame % report_every == 0 || frame == args.frames {
            let stats = sim.stats();
            println!(
                "{:5} | {:7.3} | {:10.3} | {:7.3} | {:8.3} | {:9.2e} | {:6.2}",
                frame,
                stats.time,
                stats.total_smoke,
                stats.max_temperature,
                stats.max_speed,
                stats.max_divergence,
                stats.last_step_ms
            );
            if !stats.is_finite() {
                error!("{} cells went non-finite; stopping", stats.non_finite_cells);
                break;
            }
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("{}", sim.stats());
    sim.dispose();
}

fn report(passed: bool, pass: &str, fail: &str) {
    if passed {
        println!("  PASS: {pass}");
    } else {
        println!("  FAIL: {fail}");
    }
}

fn blob_divergence(solver: PressureSolver, iterations: u32) -> Option<(f32, f32)> {
    let config = SimulationConfig {
        pressure_iterations: Some(iterations),
        vorticity: Some(false),
        pressure_solver: solver,
        ..SimulationConfig::with_size(24, 24, 24)
    };
    let mut sim = SmokeSimulation::new(&config).ok()?;
    sim.seed_velocity(|x, y, z| {
        let r = Vec3::new(x as f32 - 11.5, y as f32 - 11.5, z as f32 - 11.5);
        let g = (-r.norm_squared() / 12.5).exp();
        Vec4::new(r.x * g, r.y * g, r.z * g, 0.0)
    });
    sim.compute_divergence();
    let before = sim.stats().max_divergence;
    sim.project();
    sim.compute_divergence();
    Some((before, sim.stats().max_divergence))
}

fn run_validation_checks() {
    println!("\n=== Running Validation Checks ===\n");

    println!("Check 1: Projection reduces divergence");
    for solver in [
        PressureSolver::Jacobi,
        PressureSolver::RedBlack,
        PressureSolver::Multigrid,
    ] {
        if let Some((before, after)) = blob_divergence(solver, 40) {
            println!("  {:<10} max|div| {:.3e} -> {:.3e}", solver.name(), before, after);
            report(after < before, "divergence reduced", "divergence did not drop");
        }
    }

    println!("\nCheck 2: Buoyant smoke rises");
    let config = SimulationConfig {
        scenario: Some("smoke-column".to_string()),
        ..SimulationConfig::with_size(24, 32, 24)
    };
    if let Ok(mut sim) = SmokeSimulation::new(&config) {
        for _ in 0..90 {
            sim.step(1.0 / 60.0, StepOptions::default());
        }
        let dims = sim.dims();
        let smoke = sim.smoke();
        let (mut weighted, mut total) = (0.0, 0.0);
        for z in 0..dims.depth {
            for y in 0..dims.height {
                for x in 0..dims.width {
                    let density = smoke.get(x, y, z).w;
                    weighted += density * y as f32;
                    total += density;
                }
            }
        }
        let centre = if total > 0.0 { weighted / total } else { 0.0 };
        let source = sim.uniforms().emit_y * dims.height as f32;
        println!("  Smoke centre height: {centre:.2} cells (source at {source:.2})");
        report(centre > source, "smoke rose above the source", "smoke did not rise");
    }

    println!("\nCheck 3: Long run stays finite");
    let config = SimulationConfig {
        scenario: Some("fire-jet".to_string()),
        ..SimulationConfig::with_size(24, 32, 24)
    };
    if let Ok(mut sim) = SmokeSimulation::new(&config) {
        for _ in 0..300 {
            sim.step(1.0 / 30.0, StepOptions::default());
        }
        let stats = sim.stats();
        println!("  {stats}");
        report(stats.is_finite(), "all cells finite", "non-finite cells found");
    }

    println!("\n=== Validation Complete ===");
}
