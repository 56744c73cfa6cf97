//! Named substance presets resolving to solver parameters.
//!
//! The table is plain YAML keyed by substance name:
//!
//! ```yaml
//! Water:
//!   timestep: 0.1
//!   viscosity: 0.00002
//!   gravity: 9.81
//!   iterations: 20
//!   color: [64, 128, 255]
//!   matter_state: FLUID
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solver::MatterState;

/// Name used when parameters match no preset.
pub const CUSTOM: &str = "CUSTOM";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substance {
    pub timestep: f64,
    pub viscosity: f64,
    pub gravity: f64,
    pub iterations: usize,
    /// Display colour, 8-bit RGB.
    pub color: [u8; 3],
    #[serde(default)]
    pub matter_state: MatterState,
}

#[derive(Error, Debug)]
pub enum SubstanceError {
    #[error("Failed to read substance table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse substance table: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Unknown substance: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstanceTable {
    entries: BTreeMap<String, Substance>,
}

impl Default for SubstanceTable {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(
            "Water".to_string(),
            Substance {
                timestep: 0.1,
                viscosity: 0.00002,
                gravity: 9.81,
                iterations: 20,
                color: [64, 128, 255],
                matter_state: MatterState::Fluid,
            },
        );
        entries.insert(
            "Honey".to_string(),
            Substance {
                timestep: 0.05,
                viscosity: 0.0002,
                gravity: 9.81,
                iterations: 40,
                color: [235, 170, 40],
                matter_state: MatterState::Fluid,
            },
        );
        entries.insert(
            "Neon".to_string(),
            Substance {
                timestep: 0.1,
                viscosity: 0.000002,
                gravity: 4.0,
                iterations: 20,
                color: [255, 80, 60],
                matter_state: MatterState::Gas,
            },
        );
        entries.insert(
            "Smoke".to_string(),
            Substance {
                timestep: 0.1,
                viscosity: 0.00001,
                gravity: 2.0,
                iterations: 20,
                color: [90, 90, 90],
                matter_state: MatterState::Gas,
            },
        );
        Self { entries }
    }
}

impl SubstanceTable {
    pub fn from_yaml(text: &str) -> Result<Self, SubstanceError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SubstanceError> {
        let text = std::fs::read_to_string(path)?;
        let table = Self::from_yaml(&text)?;
        log::info!("Loaded {} substances from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Result<&Substance, SubstanceError> {
        self.entries
            .get(name)
            .ok_or_else(|| SubstanceError::Unknown(name.to_string()))
    }

    /// Add or replace every entry of `other`.
    pub fn merge(&mut self, other: SubstanceTable) {
        self.entries.extend(other.entries);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the preset whose parameters equal `substance` exactly, if any.
    pub fn classify(&self, substance: &Substance) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| *s == substance)
            .map(|(name, _)| name.as_str())
    }
}
