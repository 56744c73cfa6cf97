use thiserror::Error;

use crate::state::{cell_count, idx};

/// Orientation of a solid cell relative to its fluid neighbours.
/// Directions follow the grid: `Top` means the fluid side is at `y + 1`,
/// `Right` at `x + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WallType {
    #[default]
    None,
    Inner,
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl WallType {
    pub const ALL: [WallType; 10] = [
        WallType::None,
        WallType::Inner,
        WallType::TopLeft,
        WallType::Top,
        WallType::TopRight,
        WallType::Right,
        WallType::BottomRight,
        WallType::Bottom,
        WallType::BottomLeft,
        WallType::Left,
    ];

    /// Single-digit code used by the settings file.
    pub fn digit(self) -> u8 {
        WallType::ALL.iter().position(|&w| w == self).unwrap_or(0) as u8
    }

    pub fn from_digit(d: u8) -> Option<Self> {
        WallType::ALL.get(d as usize).copied()
    }

    pub fn is_fluid(self) -> bool {
        self == WallType::None
    }
}

/// How a field mirrors across a solid surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCondition {
    /// X velocity: sign flips across vertical (left/right) walls.
    NoSlipX,
    /// Y velocity: sign flips across horizontal (top/bottom) walls.
    NoSlipY,
    /// Zero gradient: plain copy everywhere (density, pressure, divergence).
    Neumann,
}

impl BoundaryCondition {
    /// Sign applied when mirroring across a left/right wall.
    fn horizontal_sign(self) -> f64 {
        match self {
            BoundaryCondition::NoSlipX => -1.0,
            _ => 1.0,
        }
    }

    /// Sign applied when mirroring across a top/bottom wall.
    fn vertical_sign(self) -> f64 {
        match self {
            BoundaryCondition::NoSlipY => -1.0,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObstacleError {
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("wall grid has {got} cells, expected {expected} for grid size {n}")]
    SizeMismatch { n: usize, expected: usize, got: usize },
}

/// Per-cell wall classification, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleMap {
    n: usize,
    walls: Vec<WallType>,
}

impl ObstacleMap {
    /// Build from an externally produced `(n+2) x (n+2)` wall grid.
    /// Halo entries are ignored.
    pub fn new(n: usize, walls: Vec<WallType>) -> Result<Self, ObstacleError> {
        if n == 0 {
            return Err(ObstacleError::EmptyGrid);
        }
        let expected = cell_count(n);
        if walls.len() != expected {
            return Err(ObstacleError::SizeMismatch { n, expected, got: walls.len() });
        }
        Ok(Self { n, walls })
    }

    /// Grid with no interior obstacles.
    pub fn open(n: usize) -> Self {
        Self { n, walls: vec![WallType::None; cell_count(n)] }
    }

    /// Classify a painted solid mask (`true` = solid) into wall types.
    ///
    /// A solid cell with no fluid 4-neighbour is `Inner`. Otherwise the fluid
    /// side picks the type: top wins over bottom and left over right when a
    /// thin wall has fluid on opposite sides. The halo counts as solid.
    pub fn from_solid_mask(n: usize, solid: &[bool]) -> Result<Self, ObstacleError> {
        if n == 0 {
            return Err(ObstacleError::EmptyGrid);
        }
        let expected = cell_count(n);
        if solid.len() != expected {
            return Err(ObstacleError::SizeMismatch { n, expected, got: solid.len() });
        }

        let fluid = |x: usize, y: usize| -> bool {
            (1..=n).contains(&x) && (1..=n).contains(&y) && !solid[idx(x, y, n)]
        };

        let mut walls = vec![WallType::None; expected];
        for y in 1..=n {
            for x in 1..=n {
                if !solid[idx(x, y, n)] {
                    continue;
                }
                let top = fluid(x, y + 1);
                let bottom = fluid(x, y - 1);
                let left = fluid(x - 1, y);
                let right = fluid(x + 1, y);

                let vertical = if top {
                    Some(true)
                } else if bottom {
                    Some(false)
                } else {
                    None
                };
                let horizontal = if left {
                    Some(true)
                } else if right {
                    Some(false)
                } else {
                    None
                };

                walls[idx(x, y, n)] = match (vertical, horizontal) {
                    (None, None) => WallType::Inner,
                    (Some(true), None) => WallType::Top,
                    (Some(false), None) => WallType::Bottom,
                    (None, Some(true)) => WallType::Left,
                    (None, Some(false)) => WallType::Right,
                    (Some(true), Some(true)) => WallType::TopLeft,
                    (Some(true), Some(false)) => WallType::TopRight,
                    (Some(false), Some(true)) => WallType::BottomLeft,
                    (Some(false), Some(false)) => WallType::BottomRight,
                };
            }
        }
        Ok(Self { n, walls })
    }

    pub fn grid_size(&self) -> usize {
        self.n
    }

    pub fn walls(&self) -> &[WallType] {
        &self.walls
    }

    pub fn wall(&self, x: usize, y: usize) -> WallType {
        self.walls[idx(x, y, self.n)]
    }

    #[inline(always)]
    pub fn is_fluid(&self, x: usize, y: usize) -> bool {
        self.walls[idx(x, y, self.n)].is_fluid()
    }

    /// Interior fluid cells in x-major order.
    pub fn fluid_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n;
        (1..=n).flat_map(move |x| (1..=n).map(move |y| (x, y))).filter(|&(x, y)| self.is_fluid(x, y))
    }

    /// Number of interior cells that are not fluid.
    pub fn solid_count(&self) -> usize {
        let n = self.n;
        (1..=n)
            .flat_map(|x| (1..=n).map(move |y| (x, y)))
            .filter(|&(x, y)| !self.is_fluid(x, y))
            .count()
    }

    /// Mirror `field` across the outer frame and every obstacle surface.
    ///
    /// Obstacle cells read only fluid neighbours and the frame reads only
    /// interior cells, so obstacles are resolved first and the operation is
    /// idempotent.
    pub fn set_boundary(&self, condition: BoundaryCondition, field: &mut [f64]) {
        let n = self.n;
        let hs = condition.horizontal_sign();
        let vs = condition.vertical_sign();

        for y in 1..=n {
            for x in 1..=n {
                let v = match self.walls[idx(x, y, n)] {
                    WallType::None | WallType::Inner => continue,
                    WallType::Top => vs * field[idx(x, y + 1, n)],
                    WallType::Bottom => vs * field[idx(x, y - 1, n)],
                    WallType::Right => hs * field[idx(x + 1, y, n)],
                    WallType::Left => hs * field[idx(x - 1, y, n)],
                    WallType::TopLeft => 0.5 * (field[idx(x - 1, y, n)] + field[idx(x, y + 1, n)]),
                    WallType::TopRight => 0.5 * (field[idx(x + 1, y, n)] + field[idx(x, y + 1, n)]),
                    WallType::BottomRight => 0.5 * (field[idx(x + 1, y, n)] + field[idx(x, y - 1, n)]),
                    WallType::BottomLeft => 0.5 * (field[idx(x - 1, y, n)] + field[idx(x, y - 1, n)]),
                };
                field[idx(x, y, n)] = v;
            }
        }

        for i in 1..=n {
            field[idx(0, i, n)] = hs * field[idx(1, i, n)];
            field[idx(n + 1, i, n)] = hs * field[idx(n, i, n)];
            field[idx(i, 0, n)] = vs * field[idx(i, 1, n)];
            field[idx(i, n + 1, n)] = vs * field[idx(i, n, n)];
        }

        field[idx(0, 0, n)] = 0.5 * (field[idx(1, 0, n)] + field[idx(0, 1, n)]);
        field[idx(0, n + 1, n)] = 0.5 * (field[idx(1, n + 1, n)] + field[idx(0, n, n)]);
        field[idx(n + 1, 0, n)] = 0.5 * (field[idx(n, 0, n)] + field[idx(n + 1, 1, n)]);
        field[idx(n + 1, n + 1, n)] = 0.5 * (field[idx(n, n + 1, n)] + field[idx(n + 1, n, n)]);
    }
}
