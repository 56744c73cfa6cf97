use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{debug, info};

use paintflow::config::{self, BrushConfig, Config};
use paintflow::settings::Settings;
use paintflow::solver::diagnostics::{max_speed, mean_divergence, min_density, total_density};
use paintflow::solver::{FluidSolver, ObstacleMap, SolverParams};
use paintflow::state::Xor128;
use paintflow::substance::SubstanceTable;

fn substance_table(cfg: &Config) -> Result<SubstanceTable> {
    let mut table = SubstanceTable::default();
    if let Some(path) = &cfg.simulation.substances_path {
        let extra = SubstanceTable::load(path)
            .with_context(|| format!("loading substances from {}", path.display()))?;
        table.merge(extra);
    }
    Ok(table)
}

/// Solver parameters and obstacle layout, from a saved scene or the config.
fn scene(cfg: &Config, table: &SubstanceTable) -> Result<(SolverParams, ObstacleMap)> {
    let (mut params, obstacles) = match &cfg.grid.settings_path {
        Some(path) => {
            let settings = Settings::load(path)
                .with_context(|| format!("loading settings from {}", path.display()))?;
            (settings.solver_params(), settings.obstacle_map()?)
        }
        None => {
            let name = &cfg.simulation.substance;
            let substance = table.get(name).context("resolving simulation.substance")?;
            let n = cfg.grid.size;
            if n < 3 {
                bail!("grid.size must be at least 3, got {n}");
            }
            (SolverParams::from_substance(n, substance), ObstacleMap::open(n))
        }
    };

    let sim = &cfg.simulation;
    if let Some(dt) = sim.timestep {
        params.dt = dt;
    }
    if let Some(visc) = sim.viscosity {
        params.visc = visc;
    }
    if let Some(g) = sim.gravity {
        params.gravity = g;
    }
    if let Some(iterations) = sim.iterations {
        params.iterations = iterations;
    }
    Ok((params, obstacles))
}

/// Brush cells at `(x, y)` if every one is an interior fluid cell.
fn brush_cells(brush: &BrushConfig, obstacles: &ObstacleMap, x: usize, y: usize) -> Option<Vec<(usize, usize)>> {
    let n = obstacles.grid_size();
    let cells = brush.tool.cells(x, y)?;
    let fits = cells
        .iter()
        .all(|&(cx, cy)| (1..=n).contains(&cx) && (1..=n).contains(&cy) && obstacles.is_fluid(cx, cy));
    fits.then_some(cells)
}

fn main() -> Result<()> {
    env_logger::init();

    let cfg = config::load();
    let table = substance_table(&cfg)?;
    let (params, obstacles) = scene(&cfg, &table)?;
    let obstacles = Arc::new(obstacles);
    let mut solver = FluidSolver::new(params, Arc::clone(&obstacles));
    let n = solver.grid_size();

    let brush = &cfg.brush;
    let (vx, vy) = brush.tool.direction(brush.drag[0], brush.drag[1]);
    let mut rng = Xor128::new(brush.seed);

    if !brush.random && brush_cells(brush, &obstacles, brush.x, brush.y).is_none() {
        bail!("brush at ({}, {}) does not fit inside the fluid region", brush.x, brush.y);
    }

    info!(
        "running {} ticks: tool={:?} velocity=({}, {}) amount={} random={}",
        cfg.simulation.ticks, brush.tool, vx, vy, brush.amount, brush.random
    );

    let log_every = cfg.simulation.log_every.max(1);
    let mut skipped = 0usize;
    for tick in 1..=cfg.simulation.ticks {
        let (x, y) = if brush.random {
            (rng.next_range(1, n + 1), rng.next_range(1, n + 1))
        } else {
            (brush.x, brush.y)
        };

        match brush_cells(brush, &obstacles, x, y) {
            Some(cells) => {
                solver.update_velocity_with(vx, vy, &cells);
                solver.update_density_with(brush.amount, x, y);
            }
            None => {
                debug!("tick {tick}: brush at ({x}, {y}) hits a wall, skipping injection");
                skipped += 1;
                solver.update_velocity();
                solver.update_density();
            }
        }

        if tick % log_every == 0 {
            info!(
                "tick {:>5}: mass={:.4} min_density={:.3e} max_speed={:.4} divergence={:.3e}",
                tick,
                total_density(solver.density()),
                min_density(solver.density(), &obstacles),
                max_speed(solver.velocity_x(), solver.velocity_y(), &obstacles),
                mean_divergence(solver.velocity_x(), solver.velocity_y(), &obstacles),
            );
        }
    }

    info!(
        "done: mass={:.4}, {} of {} ticks skipped injection",
        total_density(solver.density()),
        skipped,
        cfg.simulation.ticks
    );
    Ok(())
}
