use serde::{Deserialize, Serialize};

/// Velocity brush shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Point,
    Square,
    Rectangle,
}

impl Tool {
    /// Cells covered when the brush is anchored at `(x, y)`.
    /// Shapes extend right (`x + 1`) and down (`y - 1`); `None` when the
    /// anchor sits on the bottom row so the shape would leave the grid.
    pub fn cells(self, x: usize, y: usize) -> Option<Vec<(usize, usize)>> {
        let cells = match self {
            Tool::Point => vec![(x, y)],
            Tool::Square => {
                let below = y.checked_sub(1)?;
                vec![(x, y), (x + 1, y), (x, below), (x + 1, below)]
            }
            Tool::Rectangle => {
                let below = y.checked_sub(1)?;
                vec![(x, y), (x + 1, y), (x, below), (x + 1, below), (x + 2, y), (x + 2, below)]
            }
        };
        Some(cells)
    }

    /// Injected velocity magnitude per covered cell.
    pub fn strength(self) -> f64 {
        match self {
            Tool::Point => 1.2,
            Tool::Square => 0.3,
            Tool::Rectangle => 0.2,
        }
    }

    /// Velocity components for a drag; each axis is `-1`, `0` or `+1`.
    pub fn direction(self, horizontal: i32, vertical: i32) -> (f64, f64) {
        let s = self.strength();
        (s * horizontal.signum() as f64, s * vertical.signum() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_counts() {
        assert_eq!(Tool::Point.cells(5, 5), Some(vec![(5, 5)]));
        assert_eq!(Tool::Square.cells(5, 5), Some(vec![(5, 5), (6, 5), (5, 4), (6, 4)]));
        let rect = Tool::Rectangle.cells(5, 5).unwrap();
        assert_eq!(rect.len(), 6);
        assert!(rect.contains(&(7, 5)) && rect.contains(&(7, 4)));
    }

    #[test]
    fn test_bottom_row_anchor_has_no_cells() {
        assert_eq!(Tool::Point.cells(5, 0), Some(vec![(5, 0)]));
        assert_eq!(Tool::Square.cells(5, 0), None);
        assert_eq!(Tool::Rectangle.cells(5, 0), None);
        assert_eq!(Tool::Square.cells(5, 1).map(|c| c.len()), Some(4));
    }

    #[test]
    fn test_strength_drops_with_area() {
        assert!(Tool::Point.strength() > Tool::Square.strength());
        assert!(Tool::Square.strength() > Tool::Rectangle.strength());
    }

    #[test]
    fn test_direction_signs() {
        assert_eq!(Tool::Point.direction(1, -1), (1.2, -1.2));
        assert_eq!(Tool::Square.direction(-5, 0), (-0.3, 0.0));
        assert_eq!(Tool::Rectangle.direction(0, 3), (0.0, 0.2));
    }

    #[test]
    fn test_tool_yaml() {
        let t: Tool = serde_yaml::from_str("rectangle").unwrap();
        assert_eq!(t, Tool::Rectangle);
    }
}
