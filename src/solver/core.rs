use crate::state::{idx, DoubleBuffer};
use super::boundary::{BoundaryCondition, ObstacleMap};

/// Gauss-Seidel iterative linear solver restricted to fluid cells.
/// Solves: a[x,y] = (alpha * (neighbors) + b[x,y]) / beta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxationSolver {
    pub iterations: usize,
}

impl RelaxationSolver {
    pub fn new(iterations: usize) -> Self {
        Self { iterations }
    }

    /// Fixed number of in-place sweeps; boundaries are re-imposed after each one.
    pub fn solve(
        &self,
        obstacles: &ObstacleMap,
        condition: BoundaryCondition,
        a: &mut [f64],
        b: &[f64],
        alpha: f64,
        beta: f64,
    ) {
        let n = obstacles.grid_size();
        let beta_inv = 1.0 / beta;
        for _ in 0..self.iterations {
            for x in 1..=n {
                for y in 1..=n {
                    if !obstacles.is_fluid(x, y) {
                        continue;
                    }
                    let neighbors = a[idx(x - 1, y, n)]
                        + a[idx(x + 1, y, n)]
                        + a[idx(x, y - 1, n)]
                        + a[idx(x, y + 1, n)];
                    a[idx(x, y, n)] = (alpha * neighbors + b[idx(x, y, n)]) * beta_inv;
                }
            }
            obstacles.set_boundary(condition, a);
        }
    }
}

/// Implicit diffusion of `field.previous` into `field.current`.
/// `alpha` is `SolverParams::diffusion_alpha`, beta = 1 + 4 alpha
pub fn diffuse(
    relax: &RelaxationSolver,
    obstacles: &ObstacleMap,
    condition: BoundaryCondition,
    field: &mut DoubleBuffer,
    alpha: f64,
) {
    let beta = 1.0 + 4.0 * alpha;
    let (current, previous) = field.split_mut();
    relax.solve(obstacles, condition, current, previous, alpha, beta);
}

/// Semi-Lagrangian advection: traces each fluid cell backwards through
/// `(vx, vy)` and samples `d0` bilinearly into `d`.
pub fn advect(
    obstacles: &ObstacleMap,
    condition: BoundaryCondition,
    d: &mut [f64],
    d0: &[f64],
    vx: &[f64],
    vy: &[f64],
    dt: f64,
) {
    let n = obstacles.grid_size();
    let dt0 = dt * n as f64;
    // Upper clamp stays strictly below N+1 so the +1 neighbour is the halo at most.
    let hi = (n + 1) as f64 - 1e-6;

    for x in 1..=n {
        for y in 1..=n {
            if !obstacles.is_fluid(x, y) {
                continue;
            }
            let ii = idx(x, y, n);
            let px = (x as f64 - dt0 * vx[ii]).clamp(1.0, hi);
            let py = (y as f64 - dt0 * vy[ii]).clamp(1.0, hi);

            let i0 = (px.floor() as usize).min(n);
            let i1 = i0 + 1;
            let j0 = (py.floor() as usize).min(n);
            let j1 = j0 + 1;

            let s1 = px - i0 as f64;
            let s0 = 1.0 - s1;
            let t1 = py - j0 as f64;
            let t0 = 1.0 - t1;

            d[ii] = s0 * (t0 * d0[idx(i0, j0, n)] + t1 * d0[idx(i0, j1, n)])
                + s1 * (t0 * d0[idx(i1, j0, n)] + t1 * d0[idx(i1, j1, n)]);
        }
    }
    obstacles.set_boundary(condition, d);
}

/// Pressure projection: enforces incompressibility (divergence-free velocity field).
pub fn project(
    relax: &RelaxationSolver,
    obstacles: &ObstacleMap,
    vx: &mut [f64],
    vy: &mut [f64],
    p: &mut [f64],
    div: &mut [f64],
) {
    let n = obstacles.grid_size();
    let h = 1.0 / n as f64;

    // Calculate divergence
    for x in 1..=n {
        for y in 1..=n {
            if !obstacles.is_fluid(x, y) {
                continue;
            }
            div[idx(x, y, n)] = h
                * (vx[idx(x + 1, y, n)] - vx[idx(x - 1, y, n)]
                    + vy[idx(x, y + 1, n)] - vy[idx(x, y - 1, n)])
                / -2.0;
            p[idx(x, y, n)] = 0.0;
        }
    }
    obstacles.set_boundary(BoundaryCondition::Neumann, div);
    obstacles.set_boundary(BoundaryCondition::Neumann, p);

    // Solve for pressure
    relax.solve(obstacles, BoundaryCondition::Neumann, p, div, 1.0, 4.0);

    // Subtract pressure gradient from velocity
    for x in 1..=n {
        for y in 1..=n {
            if !obstacles.is_fluid(x, y) {
                continue;
            }
            vx[idx(x, y, n)] -= (p[idx(x + 1, y, n)] - p[idx(x - 1, y, n)]) / (2.0 * h);
            vy[idx(x, y, n)] -= (p[idx(x, y + 1, n)] - p[idx(x, y - 1, n)]) / (2.0 * h);
        }
    }
    obstacles.set_boundary(BoundaryCondition::NoSlipX, vx);
    obstacles.set_boundary(BoundaryCondition::NoSlipY, vy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::diagnostics::{mean_divergence, total_density};
    use crate::state::cell_count;

    const N: usize = 20;

    #[test]
    fn test_lin_solve_converges() {
        let map = ObstacleMap::open(N);
        let relax = RelaxationSolver::new(20);
        let mut x = vec![0.0; cell_count(N)];
        let mut x0 = vec![0.0; cell_count(N)];
        let mid = N / 2;
        x0[idx(mid, mid, N)] = 100.0;
        x.copy_from_slice(&x0);

        relax.solve(&map, BoundaryCondition::Neumann, &mut x, &x0, 1.0, 5.0);

        let center = x[idx(mid, mid, N)];
        let neighbor = x[idx(mid + 1, mid, N)];
        assert!(center > 0.0, "Center should still be positive");
        assert!(neighbor > 0.0, "Neighbors should get some value");
        assert!(center > neighbor, "Center should be larger than neighbor");
    }

    #[test]
    fn test_lin_solve_zero_iterations_is_noop() {
        let map = ObstacleMap::open(N);
        let relax = RelaxationSolver::new(0);
        let mut x = vec![3.0; cell_count(N)];
        let b = vec![1.0; cell_count(N)];
        relax.solve(&map, BoundaryCondition::Neumann, &mut x, &b, 1.0, 4.0);
        assert!(x.iter().all(|&v| v == 3.0));
    }

    #[test]
    fn test_lin_solve_skips_solid_cells() {
        let mut solid = vec![false; cell_count(N)];
        for y in 8..=12 {
            for x in 8..=12 {
                solid[idx(x, y, N)] = true;
            }
        }
        let map = ObstacleMap::from_solid_mask(N, &solid).unwrap();
        let relax = RelaxationSolver::new(10);
        let mut a = vec![0.0; cell_count(N)];
        a[idx(10, 10, N)] = 42.0;
        let b = vec![1.0; cell_count(N)];
        relax.solve(&map, BoundaryCondition::Neumann, &mut a, &b, 1.0, 4.0);
        assert_eq!(a[idx(10, 10, N)], 42.0, "Inner cell must never be relaxed");
    }

    #[test]
    fn test_diffuse_smooths() {
        let map = ObstacleMap::open(N);
        let relax = RelaxationSolver::new(20);
        let mut field = DoubleBuffer::new(cell_count(N));
        let mid = N / 2;
        field.previous_mut()[idx(mid, mid, N)] = 100.0;

        diffuse(&relax, &map, BoundaryCondition::Neumann, &mut field, 0.1 * 0.01 * (N * N) as f64);

        let center = field.current()[idx(mid, mid, N)];
        let neighbor = field.current()[idx(mid + 1, mid, N)];
        assert!(center < 100.0, "Center should be less than original spike");
        assert!(neighbor > 0.0, "Neighbors should gain some value");
        assert_eq!(field.previous()[idx(mid, mid, N)], 100.0, "Source buffer untouched");
    }

    #[test]
    fn test_diffuse_conserves_mass_when_converged() {
        let map = ObstacleMap::open(N);
        let relax = RelaxationSolver::new(200);
        let mut field = DoubleBuffer::new(cell_count(N));
        field.previous_mut()[idx(N / 2, N / 2, N)] = 1.0;
        diffuse(&relax, &map, BoundaryCondition::Neumann, &mut field, 0.1 * 0.001 * (N * N) as f64);

        let interior: f64 = map.fluid_cells().map(|(x, y)| field.current()[idx(x, y, N)]).sum();
        assert!((interior - 1.0).abs() < 1e-3, "interior mass should be ~1, got {}", interior);
        assert!(total_density(field.current()) >= interior);
    }

    #[test]
    fn test_advect_zero_velocity_preserves() {
        let map = ObstacleMap::open(N);
        let mut d0 = vec![0.0; cell_count(N)];
        let mut d = vec![0.0; cell_count(N)];
        let vx = vec![0.0; cell_count(N)];
        let vy = vec![0.0; cell_count(N)];

        for x in 1..=N {
            for y in 1..=N {
                d0[idx(x, y, N)] = x as f64 / N as f64 + y as f64;
            }
        }

        advect(&map, BoundaryCondition::Neumann, &mut d, &d0, &vx, &vy, 0.1);

        for (x, y) in map.fluid_cells() {
            let orig = d0[idx(x, y, N)];
            let advected = d[idx(x, y, N)];
            assert!(
                (orig - advected).abs() < 1e-10,
                "Zero velocity should preserve field at ({}, {}): {} vs {}",
                x, y, orig, advected
            );
        }
    }

    #[test]
    fn test_advect_uniform_field_unchanged() {
        let map = ObstacleMap::open(N);
        let d0 = vec![5.0; cell_count(N)];
        let mut d = vec![0.0; cell_count(N)];
        let vx = vec![0.3; cell_count(N)];
        let vy = vec![-0.2; cell_count(N)];

        advect(&map, BoundaryCondition::Neumann, &mut d, &d0, &vx, &vy, 0.1);

        for (x, y) in map.fluid_cells() {
            let val = d[idx(x, y, N)];
            assert!(
                (val - 5.0).abs() < 1e-9,
                "Uniform field should stay uniform: got {} at ({}, {})",
                val, x, y
            );
        }
    }

    #[test]
    fn test_advect_shifts_by_one_cell() {
        // dt * N * vx = 1 cell: value at x comes from x - 1
        let map = ObstacleMap::open(N);
        let mut d0 = vec![0.0; cell_count(N)];
        let mut d = vec![0.0; cell_count(N)];
        d0[idx(5, 7, N)] = 1.0;
        let vx = vec![1.0 / (0.1 * N as f64); cell_count(N)];
        let vy = vec![0.0; cell_count(N)];

        advect(&map, BoundaryCondition::Neumann, &mut d, &d0, &vx, &vy, 0.1);

        assert!((d[idx(6, 7, N)] - 1.0).abs() < 1e-9, "got {}", d[idx(6, 7, N)]);
        assert!(d[idx(5, 7, N)].abs() < 1e-9);
    }

    #[test]
    fn test_advect_clamps_far_backtrace() {
        let map = ObstacleMap::open(N);
        let d0 = vec![1.0; cell_count(N)];
        let mut d = vec![0.0; cell_count(N)];
        let vx = vec![-50.0; cell_count(N)];
        let vy = vec![50.0; cell_count(N)];

        advect(&map, BoundaryCondition::Neumann, &mut d, &d0, &vx, &vy, 0.5);

        for (x, y) in map.fluid_cells() {
            let val = d[idx(x, y, N)];
            assert!(val.is_finite() && (val - 1.0).abs() < 1e-9,
                "Clamped sample should stay in range at ({},{}): got {}", x, y, val);
        }
    }

    #[test]
    fn test_project_reduces_divergence() {
        let map = ObstacleMap::open(N);
        let relax = RelaxationSolver::new(40);
        let size = cell_count(N);
        let mut vx = vec![0.0; size];
        let mut vy = vec![0.0; size];
        let mut p = vec![0.0; size];
        let mut div = vec![0.0; size];

        let c = (N / 2) as f64;
        for x in 1..=N {
            for y in 1..=N {
                let dx = x as f64 - c;
                let dy = y as f64 - c;
                let r2 = dx * dx + dy * dy;
                let sigma = (N * N) as f64 / 32.0;
                vx[idx(x, y, N)] = dx * 0.01 * (-r2 / sigma).exp();
                vy[idx(x, y, N)] = dy * 0.01 * (-r2 / sigma).exp();
            }
        }

        let div_before = mean_divergence(&vx, &vy, &map);
        assert!(div_before > 0.0, "Should have some initial divergence");

        project(&relax, &map, &mut vx, &mut vy, &mut p, &mut div);

        let div_after = mean_divergence(&vx, &vy, &map);
        assert!(
            div_after < div_before,
            "Divergence should be reduced: before={}, after={}",
            div_before, div_after
        );
    }
}
