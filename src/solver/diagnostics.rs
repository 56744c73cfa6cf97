use crate::state::idx;
use super::boundary::ObstacleMap;

/// Sum over every stored cell, halo included.
pub fn total_density(density: &[f64]) -> f64 {
    density.iter().sum()
}

/// Largest velocity magnitude over fluid cells.
pub fn max_speed(vx: &[f64], vy: &[f64], obstacles: &ObstacleMap) -> f64 {
    let n = obstacles.grid_size();
    obstacles
        .fluid_cells()
        .map(|(x, y)| {
            let ii = idx(x, y, n);
            (vx[ii] * vx[ii] + vy[ii] * vy[ii]).sqrt()
        })
        .fold(0.0_f64, f64::max)
}

/// Mean |div v| over fluid cells, central differences in grid units.
pub fn mean_divergence(vx: &[f64], vy: &[f64], obstacles: &ObstacleMap) -> f64 {
    let n = obstacles.grid_size();
    let mut sum = 0.0;
    let mut count = 0usize;
    for (x, y) in obstacles.fluid_cells() {
        let d = 0.5
            * (vx[idx(x + 1, y, n)] - vx[idx(x - 1, y, n)] + vy[idx(x, y + 1, n)]
                - vy[idx(x, y - 1, n)]);
        sum += d.abs();
        count += 1;
    }
    if count > 0 { sum / count as f64 } else { 0.0 }
}

/// Smallest density value over fluid cells; negative values flag numerical undershoot.
pub fn min_density(density: &[f64], obstacles: &ObstacleMap) -> f64 {
    let n = obstacles.grid_size();
    obstacles
        .fluid_cells()
        .map(|(x, y)| density[idx(x, y, n)])
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::cell_count;

    const N: usize = 10;

    #[test]
    fn test_total_density_includes_halo() {
        let mut d = vec![0.0; cell_count(N)];
        d[idx(0, 0, N)] = 1.0;
        d[idx(5, 5, N)] = 2.0;
        assert!((total_density(&d) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_speed_zero() {
        let map = ObstacleMap::open(N);
        let v = vec![0.0; cell_count(N)];
        assert_eq!(max_speed(&v, &v, &map), 0.0);
    }

    #[test]
    fn test_max_speed_ignores_halo() {
        let map = ObstacleMap::open(N);
        let mut vx = vec![0.0; cell_count(N)];
        let vy = vec![0.0; cell_count(N)];
        vx[idx(0, 3, N)] = 100.0;
        vx[idx(3, 4, N)] = -3.0;
        assert!((max_speed(&vx, &vy, &map) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_divergence_of_uniform_flow_is_zero() {
        let map = ObstacleMap::open(N);
        let vx = vec![1.0; cell_count(N)];
        let vy = vec![-2.0; cell_count(N)];
        assert!(mean_divergence(&vx, &vy, &map).abs() < 1e-12);
    }

    #[test]
    fn test_min_density_reports_undershoot() {
        let map = ObstacleMap::open(N);
        let mut d = vec![1.0; cell_count(N)];
        d[idx(4, 4, N)] = -0.5;
        assert_eq!(min_density(&d, &map), -0.5);
    }
}
