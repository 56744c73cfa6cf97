use std::path::PathBuf;

use serde::Deserialize;

use crate::brush::Tool;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub simulation: SimulationConfig,
    pub brush: BrushConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub size: usize,
    /// Saved scene to start from; overrides `size` and the substance.
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub substance: String,
    /// Extra presets merged over the built-in table.
    pub substances_path: Option<PathBuf>,
    pub ticks: usize,
    pub log_every: usize,
    pub timestep: Option<f64>,
    pub viscosity: Option<f64>,
    pub gravity: Option<f64>,
    pub iterations: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub tool: Tool,
    pub x: usize,
    pub y: usize,
    /// Density added per tick at the brush anchor.
    pub amount: f64,
    /// Drag direction, each axis in -1..=1.
    pub drag: [i32; 2],
    /// Move the brush to a random fluid cell every tick.
    pub random: bool,
    pub seed: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            simulation: SimulationConfig::default(),
            brush: BrushConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { size: 60, settings_path: None }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            substance: "Water".to_string(),
            substances_path: None,
            ticks: 600,
            log_every: 60,
            timestep: None,
            viscosity: None,
            gravity: None,
            iterations: None,
        }
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Point,
            x: 30,
            y: 45,
            amount: 1.0,
            drag: [0, -1],
            random: false,
            seed: 42,
        }
    }
}

pub fn load() -> Config {
    load_from(std::path::Path::new("paintflow.yaml"))
}

pub fn load_from(path: &std::path::Path) -> Config {
    if path.exists() {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("Failed to parse {}: {e}; using defaults", path.display());
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {e}; using defaults", path.display());
                Config::default()
            }
        }
    } else {
        Config::default()
    }
}
