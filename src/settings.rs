//! Saved scene settings: parameters plus the obstacle layout.
//!
//! Plain text, one value per line:
//!
//! ```text
//! 60            grid size
//! true          interpolate
//! Water         substance name, CUSTOM when none matches
//! FLUID         matter state
//! 0.1           timestep
//! 0.00002       viscosity
//! 9.81          gravity
//! 20            relaxation iterations
//! 64,128,255    colour
//! 0000...       N lines of WallType digits, one line per x column, char per y
//! 1111...       optional: N lines of PaintHelper digits, same layout
//! ```

use std::path::Path;

use thiserror::Error;

use crate::picking::{PaintGrid, PaintHelper};
use crate::solver::{MatterState, ObstacleError, ObstacleMap, SolverParams, WallType};
use crate::state::{cell_count, idx};
use crate::substance::{Substance, SubstanceTable, CUSTOM};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file ends before line {line} ({field})")]
    MissingLine { line: usize, field: &'static str },
    #[error("Invalid {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
    #[error("Invalid cell digit {ch:?} at row {row}, column {col}")]
    BadDigit { row: usize, col: usize, ch: char },
    #[error("Row {row} has {got} cells, expected {expected}")]
    ShortRow { row: usize, expected: usize, got: usize },
    #[error(transparent)]
    Obstacle(#[from] ObstacleError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub grid_size: usize,
    pub interpolate: bool,
    pub substance_name: String,
    pub substance: Substance,
    walls: Vec<WallType>,
    pub paint: Option<PaintGrid>,
}

struct Lines<'a> {
    inner: std::str::Lines<'a>,
    read: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self { inner: text.lines(), read: 0 }
    }

    /// Next trimmed line with its 1-based number.
    fn next(&mut self, field: &'static str) -> Result<(usize, &'a str), SettingsError> {
        let line = self.inner.next().ok_or(SettingsError::MissingLine { line: self.read + 1, field })?;
        self.read += 1;
        Ok((self.read, line.trim()))
    }

    fn has_more(&self) -> bool {
        self.inner.clone().any(|l| !l.trim().is_empty())
    }

    fn value<T: std::str::FromStr>(&mut self, field: &'static str) -> Result<T, SettingsError> {
        let (_, line) = self.next(field)?;
        line.parse()
            .map_err(|_| SettingsError::InvalidValue { field, value: line.to_string() })
    }
}

fn parse_color(line: &str) -> Option<[u8; 3]> {
    let mut parts = line.split(',').map(|p| p.trim().parse::<u8>());
    let r = parts.next()?.ok()?;
    let g = parts.next()?.ok()?;
    let b = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some([r, g, b])
}

/// Read `n` column lines of digits into an `(n+2)^2` grid.
fn parse_grid<T: Copy + Default>(
    lines: &mut Lines<'_>,
    n: usize,
    field: &'static str,
    decode: impl Fn(u8) -> Option<T>,
) -> Result<Vec<T>, SettingsError> {
    let mut cells = vec![T::default(); cell_count(n)];
    for x in 1..=n {
        let (row, line) = lines.next(field)?;
        let chars: Vec<char> = line.chars().collect();
        if chars.len() < n {
            return Err(SettingsError::ShortRow { row, expected: n, got: chars.len() });
        }
        for (col, &ch) in chars.iter().take(n).enumerate() {
            let value = ch
                .to_digit(10)
                .and_then(|d| decode(d as u8))
                .ok_or(SettingsError::BadDigit { row, col: col + 1, ch })?;
            cells[idx(x, col + 1, n)] = value;
        }
    }
    Ok(cells)
}

fn write_grid<T: Copy>(out: &mut String, n: usize, cells: &[T], encode: impl Fn(T) -> u8) {
    for x in 1..=n {
        for y in 1..=n {
            out.push(char::from(b'0' + encode(cells[idx(x, y, n)])));
        }
        out.push('\n');
    }
}

impl Settings {
    /// Settings for an open grid filled with `substance`; the name is
    /// resolved against `table`.
    pub fn new(grid_size: usize, substance: Substance, table: &SubstanceTable) -> Self {
        let substance_name = table.classify(&substance).unwrap_or(CUSTOM).to_string();
        Self {
            grid_size,
            interpolate: true,
            substance_name,
            substance,
            walls: vec![WallType::None; cell_count(grid_size)],
            paint: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut lines = Lines::new(text);

        let grid_size: usize = lines.value("grid size")?;
        if grid_size == 0 {
            return Err(SettingsError::Obstacle(ObstacleError::EmptyGrid));
        }
        let interpolate: bool = lines.value("interpolate")?;
        let (_, name) = lines.next("substance name")?;
        let substance_name = name.to_string();

        let (_, state) = lines.next("matter state")?;
        let matter_state = MatterState::parse(state).ok_or_else(|| SettingsError::InvalidValue {
            field: "matter state",
            value: state.to_string(),
        })?;
        let timestep: f64 = lines.value("timestep")?;
        let viscosity: f64 = lines.value("viscosity")?;
        let gravity: f64 = lines.value("gravity")?;
        let iterations: usize = lines.value("iterations")?;
        let (_, color_line) = lines.next("colour")?;
        let color = parse_color(color_line).ok_or_else(|| SettingsError::InvalidValue {
            field: "colour",
            value: color_line.to_string(),
        })?;

        let walls = parse_grid(&mut lines, grid_size, "wall grid", WallType::from_digit)?;

        let paint = if lines.has_more() {
            let cells = parse_grid(&mut lines, grid_size, "paint grid", PaintHelper::from_digit)?;
            Some(PaintGrid::from_cells(grid_size, cells)?)
        } else {
            None
        };

        Ok(Self {
            grid_size,
            interpolate,
            substance_name,
            substance: Substance { timestep, viscosity, gravity, iterations, color, matter_state },
            walls,
            paint,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::parse(&text)?;
        log::info!(
            "Loaded settings from {:?}: N={}, substance={}",
            path,
            settings.grid_size,
            settings.substance_name
        );
        Ok(settings)
    }

    pub fn to_text(&self) -> String {
        let s = &self.substance;
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.grid_size));
        out.push_str(&format!("{}\n", self.interpolate));
        out.push_str(&format!("{}\n", self.substance_name));
        out.push_str(&format!("{}\n", s.matter_state.as_str()));
        out.push_str(&format!("{}\n", s.timestep));
        out.push_str(&format!("{}\n", s.viscosity));
        out.push_str(&format!("{}\n", s.gravity));
        out.push_str(&format!("{}\n", s.iterations));
        out.push_str(&format!("{},{},{}\n", s.color[0], s.color[1], s.color[2]));
        write_grid(&mut out, self.grid_size, &self.walls, WallType::digit);
        if let Some(paint) = &self.paint {
            write_grid(&mut out, self.grid_size, paint.cells(), PaintHelper::digit);
        }
        out
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_text())?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn solver_params(&self) -> SolverParams {
        SolverParams::from_substance(self.grid_size, &self.substance)
    }

    pub fn obstacle_map(&self) -> Result<ObstacleMap, SettingsError> {
        Ok(ObstacleMap::new(self.grid_size, self.walls.clone())?)
    }

    /// Replace the wall layout with `obstacles`' classification.
    pub fn set_obstacles(&mut self, obstacles: &ObstacleMap) {
        self.grid_size = obstacles.grid_size();
        self.walls = obstacles.walls().to_vec();
    }

    /// Replace the wall layout with the painted grid, keeping the grid itself.
    pub fn set_paint(&mut self, paint: PaintGrid) -> Result<(), SettingsError> {
        let obstacles = paint.obstacle_map()?;
        self.set_obstacles(&obstacles);
        self.paint = Some(paint);
        Ok(())
    }

    pub fn wall(&self, x: usize, y: usize) -> WallType {
        self.walls[idx(x, y, self.grid_size)]
    }
}
