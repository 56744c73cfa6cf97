mod boundary;
mod core;
pub mod diagnostics;
mod params;

// Re-export public API
pub use boundary::{BoundaryCondition, ObstacleError, ObstacleMap, WallType};
pub use self::core::RelaxationSolver;
pub use params::{MatterState, SolverParams};

use std::sync::Arc;

use crate::state::{idx, FieldSet};
use self::core::{advect, diffuse, project};

/// Stable-fluids solver over one obstacle map.
///
/// Every per-tick call runs to completion and never fails. Coordinates passed
/// to the injection methods must be interior fluid cells; they are not checked.
pub struct FluidSolver {
    params: SolverParams,
    h: f64,
    fields: FieldSet,
    relax: RelaxationSolver,
    obstacles: Arc<ObstacleMap>,
}

impl FluidSolver {
    /// The grid size is taken from the obstacle map.
    pub fn new(params: SolverParams, obstacles: Arc<ObstacleMap>) -> Self {
        let n = obstacles.grid_size();
        if params.grid_size != n {
            log::warn!(
                "solver grid size {} differs from obstacle map {}; using {}",
                params.grid_size,
                n,
                n
            );
        }
        let params = SolverParams { grid_size: n, ..params };
        log::info!(
            "fluid solver: N={} dt={} visc={} iterations={} gravity={} state={} solid_cells={}",
            n,
            params.dt,
            params.visc,
            params.iterations,
            params.gravity,
            params.matter_state.as_str(),
            obstacles.solid_count()
        );
        Self {
            h: 1.0 / n as f64,
            fields: FieldSet::new(n),
            relax: RelaxationSolver::new(params.iterations),
            params,
            obstacles,
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn grid_size(&self) -> usize {
        self.obstacles.grid_size()
    }

    /// Cell width in domain units (1 / N).
    pub fn grid_spacing(&self) -> f64 {
        self.h
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn obstacles(&self) -> &ObstacleMap {
        &self.obstacles
    }

    /// Shared handle to the obstacle map, e.g. for a second solver instance.
    pub fn obstacles_handle(&self) -> Arc<ObstacleMap> {
        Arc::clone(&self.obstacles)
    }

    pub fn density(&self) -> &[f64] {
        self.fields.density.current()
    }

    pub fn velocity_x(&self) -> &[f64] {
        self.fields.velocity_x.current()
    }

    pub fn velocity_y(&self) -> &[f64] {
        self.fields.velocity_y.current()
    }

    /// Density at one cell of the current buffer.
    pub fn density_at(&self, x: usize, y: usize) -> f64 {
        self.density()[idx(x, y, self.grid_size())]
    }

    /// Velocity at one cell of the current buffers.
    pub fn velocity_at(&self, x: usize, y: usize) -> (f64, f64) {
        let ii = idx(x, y, self.grid_size());
        (self.velocity_x()[ii], self.velocity_y()[ii])
    }

    /// Adds `dt * value` into the previous density buffer.
    pub fn add_density(&mut self, value: f64, x: usize, y: usize) {
        let ii = idx(x, y, self.grid_size());
        self.fields.density.previous_mut()[ii] += self.params.dt * value;
    }

    /// Adds `dt * density * v` at each listed cell, one cell at a time.
    ///
    /// The source lands in the previous velocity buffers, next to the body
    /// force: those are the right hand side of the diffusion solve that
    /// follows, so the impulse carries into the step result.
    pub fn add_velocity(&mut self, vx: f64, vy: f64, cells: &[(usize, usize)]) {
        let n = self.grid_size();
        let dt = self.params.dt;
        let density = self.fields.density.current();
        let vx0 = self.fields.velocity_x.previous_mut();
        for &(x, y) in cells {
            let ii = idx(x, y, n);
            vx0[ii] += dt * density[ii] * vx;
        }
        let vy0 = self.fields.velocity_y.previous_mut();
        for &(x, y) in cells {
            let ii = idx(x, y, n);
            vy0[ii] += dt * density[ii] * vy;
        }
    }

    /// Gravity/buoyancy on the previous y velocity, scaled by local density.
    pub fn apply_body_force(&mut self) {
        let n = self.grid_size();
        let k = self.params.matter_state.polarity() * self.params.dt * self.params.gravity;
        let density = self.fields.density.current();
        let vy0 = self.fields.velocity_y.previous_mut();
        for (x, y) in self.obstacles.fluid_cells() {
            let ii = idx(x, y, n);
            vy0[ii] += k * density[ii];
        }
    }

    /// Makes the current velocity buffers divergence-free.
    pub fn project(&mut self) {
        let f = &mut self.fields;
        project(
            &self.relax,
            &self.obstacles,
            f.velocity_x.current_mut(),
            f.velocity_y.current_mut(),
            &mut f.pressure,
            &mut f.divergence,
        );
    }

    fn diffuse_velocity(&mut self) {
        let alpha = self.params.diffusion_alpha();
        diffuse(&self.relax, &self.obstacles, BoundaryCondition::NoSlipX, &mut self.fields.velocity_x, alpha);
        diffuse(&self.relax, &self.obstacles, BoundaryCondition::NoSlipY, &mut self.fields.velocity_y, alpha);
    }

    /// Self-advection: both components are traced through the previous buffers.
    fn advect_velocity(&mut self) {
        let dt = self.params.dt;
        let f = &mut self.fields;
        {
            let (vx, vx0) = f.velocity_x.split_mut();
            advect(&self.obstacles, BoundaryCondition::NoSlipX, vx, vx0, vx0, f.velocity_y.previous(), dt);
        }
        {
            let (vy, vy0) = f.velocity_y.split_mut();
            advect(&self.obstacles, BoundaryCondition::NoSlipY, vy, vy0, f.velocity_x.previous(), vy0, dt);
        }
    }

    fn swap_velocity(&mut self) {
        self.fields.velocity_x.swap();
        self.fields.velocity_y.swap();
    }

    fn step_velocity(&mut self) {
        self.diffuse_velocity();
        self.project();
        self.swap_velocity();
        self.advect_velocity();
        self.swap_velocity();
        self.project();
    }

    /// One velocity tick without injection.
    pub fn update_velocity(&mut self) {
        self.apply_body_force();
        self.step_velocity();
    }

    /// One velocity tick injecting `(vx, vy)` at every listed cell.
    pub fn update_velocity_with(&mut self, vx: f64, vy: f64, cells: &[(usize, usize)]) {
        self.apply_body_force();
        self.add_velocity(vx, vy, cells);
        self.step_velocity();
    }

    fn step_density(&mut self) {
        let dt = self.params.dt;
        if self.params.matter_state.diffuses_density() {
            let alpha = self.params.diffusion_alpha();
            diffuse(&self.relax, &self.obstacles, BoundaryCondition::Neumann, &mut self.fields.density, alpha);
            self.fields.density.swap();
        }
        let f = &mut self.fields;
        let (d, d0) = f.density.split_mut();
        advect(
            &self.obstacles,
            BoundaryCondition::Neumann,
            d,
            d0,
            f.velocity_x.current(),
            f.velocity_y.current(),
            dt,
        );
        f.density.swap();
    }

    /// One density tick without injection.
    pub fn update_density(&mut self) {
        self.step_density();
    }

    /// One density tick injecting `amount` at `(x, y)`.
    pub fn update_density_with(&mut self, amount: f64, x: usize, y: usize) {
        self.add_density(amount, x, y);
        self.step_density();
    }
}
