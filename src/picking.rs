//! Mapping surface hits onto grid cells, and the wall-painting grid.

use thiserror::Error;

use crate::solver::{ObstacleError, ObstacleMap};
use crate::state::{cell_count, idx};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PickError {
    #[error("No surface under the pointer")]
    NotHit,
    #[error("Cell ({x}, {y}) is not a fluid cell")]
    InvalidCoordinate { x: usize, y: usize },
    #[error("A wall block cannot be painted at ({x}, {y})")]
    NotPaintable { x: usize, y: usize },
}

/// Which corner of a painted 2x2 wall block a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintHelper {
    /// Outer frame.
    Boundary,
    #[default]
    None,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl PaintHelper {
    pub const ALL: [PaintHelper; 6] = [
        PaintHelper::Boundary,
        PaintHelper::None,
        PaintHelper::TopLeft,
        PaintHelper::TopRight,
        PaintHelper::BottomLeft,
        PaintHelper::BottomRight,
    ];

    pub fn digit(self) -> u8 {
        PaintHelper::ALL.iter().position(|&p| p == self).unwrap_or(1) as u8
    }

    pub fn from_digit(d: u8) -> Option<Self> {
        PaintHelper::ALL.get(d as usize).copied()
    }
}

/// Painted wall blocks over the `(n+2) x (n+2)` texture.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintGrid {
    n: usize,
    cells: Vec<PaintHelper>,
}

impl PaintGrid {
    /// Empty interior framed by `Boundary`.
    pub fn new(n: usize) -> Self {
        let mut cells = vec![PaintHelper::None; cell_count(n)];
        for i in 0..n + 2 {
            cells[idx(i, 0, n)] = PaintHelper::Boundary;
            cells[idx(i, n + 1, n)] = PaintHelper::Boundary;
            cells[idx(0, i, n)] = PaintHelper::Boundary;
            cells[idx(n + 1, i, n)] = PaintHelper::Boundary;
        }
        Self { n, cells }
    }

    /// Interior cells from a saved grid; the frame is reset to `Boundary`.
    pub fn from_cells(n: usize, cells: Vec<PaintHelper>) -> Result<Self, ObstacleError> {
        if n == 0 {
            return Err(ObstacleError::EmptyGrid);
        }
        let expected = cell_count(n);
        if cells.len() != expected {
            return Err(ObstacleError::SizeMismatch { n, expected, got: cells.len() });
        }
        let mut grid = Self::new(n);
        for y in 1..=n {
            for x in 1..=n {
                grid.cells[idx(x, y, n)] = cells[idx(x, y, n)];
            }
        }
        Ok(grid)
    }

    pub fn grid_size(&self) -> usize {
        self.n
    }

    pub fn cells(&self) -> &[PaintHelper] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> PaintHelper {
        self.cells[idx(x, y, self.n)]
    }

    /// Whether the 2x2 block anchored at `(x, y)` lies inside the interior.
    fn block_fits(&self, x: usize, y: usize) -> bool {
        (1..self.n).contains(&x) && (2..=self.n).contains(&y)
    }

    /// Write (or erase) the 2x2 block whose top-left corner is `(x, y)`.
    /// The block covers `x..=x+1` and `y-1..=y`. Returns `false`, leaving
    /// the grid untouched, when the block would reach the frame.
    pub fn stamp(&mut self, x: usize, y: usize, erase: bool) -> bool {
        if !self.block_fits(x, y) {
            return false;
        }
        let n = self.n;
        let corners = [
            (x, y, PaintHelper::TopLeft),
            (x + 1, y, PaintHelper::TopRight),
            (x, y - 1, PaintHelper::BottomLeft),
            (x + 1, y - 1, PaintHelper::BottomRight),
        ];
        for (cx, cy, helper) in corners {
            self.cells[idx(cx, cy, n)] = if erase { PaintHelper::None } else { helper };
        }
        true
    }

    /// `true` for every painted interior cell, suitable for
    /// [`ObstacleMap::from_solid_mask`].
    pub fn solid_mask(&self) -> Vec<bool> {
        let n = self.n;
        let mut mask = vec![false; cell_count(n)];
        for y in 1..=n {
            for x in 1..=n {
                mask[idx(x, y, n)] = self.get(x, y) != PaintHelper::None;
            }
        }
        mask
    }

    pub fn obstacle_map(&self) -> Result<ObstacleMap, ObstacleError> {
        ObstacleMap::from_solid_mask(self.n, &self.solid_mask())
    }

    /// Whether a block anchored at `(x, y)` may be painted (`erase == false`)
    /// or removed (`erase == true`).
    ///
    /// Painting needs an empty 2x2 footprint, and no diagonal contact with
    /// another block unless the two already share an edge neighbour.
    /// Erasing needs `(x, y)` to be the top-left corner of an existing block.
    pub fn paintable(&self, x: usize, y: usize, erase: bool) -> bool {
        if !self.block_fits(x, y) {
            return false;
        }
        if erase {
            return self.get(x, y) == PaintHelper::TopLeft;
        }

        let empty = |cx: usize, cy: usize| self.get(cx, cy) == PaintHelper::None;

        let footprint = empty(x, y) && empty(x + 1, y) && empty(x, y - 1) && empty(x + 1, y - 1);
        if !footprint {
            return false;
        }

        let skip_top_right = !empty(x + 1, y + 1) || !empty(x + 2, y);
        let skip_right_bottom = !empty(x + 2, y - 1) || !empty(x + 1, y - 2);
        let skip_bottom_left = !empty(x, y - 2) || !empty(x - 1, y - 1);
        let skip_left_top = !empty(x - 1, y) || !empty(x, y + 1);

        (skip_top_right || empty(x + 2, y + 1))
            && (skip_right_bottom || empty(x + 2, y - 2))
            && (skip_bottom_left || empty(x - 1, y - 2))
            && (skip_left_top || empty(x - 1, y + 1))
    }
}

/// Texture cell under a normalised hit, without validity checks.
fn texel(hit: (f64, f64), n: usize) -> (usize, usize) {
    let size = (n + 2) as f64;
    let max = n + 1;
    let x = ((hit.0 * size).floor().max(0.0) as usize).min(max);
    let y = ((hit.1 * size).floor().max(0.0) as usize).min(max);
    (x, y)
}

fn in_halo(x: usize, y: usize, n: usize) -> bool {
    x == 0 || y == 0 || x == n + 1 || y == n + 1
}

/// Fluid cell under a normalised surface hit in `[0, 1)^2`.
pub fn pick_cell(hit: Option<(f64, f64)>, obstacles: &ObstacleMap) -> Result<(usize, usize), PickError> {
    let hit = hit.ok_or(PickError::NotHit)?;
    let n = obstacles.grid_size();
    let (x, y) = texel(hit, n);
    if in_halo(x, y, n) || !obstacles.is_fluid(x, y) {
        return Err(PickError::InvalidCoordinate { x, y });
    }
    Ok((x, y))
}

/// Anchor cell for painting (`painting == true`) or erasing a wall block.
pub fn pick_paint_cell(
    hit: Option<(f64, f64)>,
    paint: &PaintGrid,
    painting: bool,
) -> Result<(usize, usize), PickError> {
    let hit = hit.ok_or(PickError::NotHit)?;
    let n = paint.grid_size();
    let (x, y) = texel(hit, n);
    if in_halo(x, y, n) {
        return Err(PickError::InvalidCoordinate { x, y });
    }
    if !paint.paintable(x, y, !painting) {
        return Err(PickError::NotPaintable { x, y });
    }
    Ok((x, y))
}
