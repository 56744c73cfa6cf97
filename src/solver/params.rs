use serde::{Deserialize, Serialize};

use crate::substance::Substance;

/// Matter state of the simulated substance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatterState {
    #[default]
    Fluid,
    Gas,
}

impl MatterState {
    /// Sign of the body force along +y: liquids sink, gases rise.
    pub fn polarity(self) -> f64 {
        match self {
            MatterState::Fluid => -1.0,
            MatterState::Gas => 1.0,
        }
    }

    /// Dense liquids diffuse their density; gases rely on advection alone.
    pub fn diffuses_density(self) -> bool {
        matches!(self, MatterState::Fluid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatterState::Fluid => "FLUID",
            MatterState::Gas => "GAS",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FLUID" => Some(MatterState::Fluid),
            "GAS" => Some(MatterState::Gas),
            _ => None,
        }
    }
}

/// Solver parameters for the fluid simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParams {
    pub grid_size: usize,
    pub dt: f64,
    pub visc: f64,
    pub iterations: usize,
    pub gravity: f64,
    pub matter_state: MatterState,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            grid_size: 60,
            dt: 0.1,
            visc: 0.00002,
            iterations: 20,
            gravity: 9.81,
            matter_state: MatterState::Fluid,
        }
    }
}

impl SolverParams {
    /// Parameters resolved from a substance preset.
    pub fn from_substance(grid_size: usize, substance: &Substance) -> Self {
        Self {
            grid_size,
            dt: substance.timestep,
            visc: substance.viscosity,
            iterations: substance.iterations,
            gravity: substance.gravity,
            matter_state: substance.matter_state,
        }
    }

    /// Diffusion coefficient handed to the relaxation solver: dt * visc * N^2.
    pub fn diffusion_alpha(&self) -> f64 {
        let n = self.grid_size as f64;
        self.dt * self.visc * n * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_signs() {
        assert_eq!(MatterState::Fluid.polarity(), -1.0);
        assert_eq!(MatterState::Gas.polarity(), 1.0);
    }

    #[test]
    fn test_only_fluid_diffuses_density() {
        assert!(MatterState::Fluid.diffuses_density());
        assert!(!MatterState::Gas.diffuses_density());
    }

    #[test]
    fn test_matter_state_parse() {
        assert_eq!(MatterState::parse("FLUID"), Some(MatterState::Fluid));
        assert_eq!(MatterState::parse(" gas "), Some(MatterState::Gas));
        assert_eq!(MatterState::parse("plasma"), None);
        assert_eq!(MatterState::parse(MatterState::Gas.as_str()), Some(MatterState::Gas));
    }

    #[test]
    fn test_matter_state_yaml() {
        let s: MatterState = serde_yaml::from_str("GAS").unwrap();
        assert_eq!(s, MatterState::Gas);
    }

    #[test]
    fn test_diffusion_alpha() {
        let p = SolverParams { grid_size: 10, dt: 0.5, visc: 0.01, ..SolverParams::default() };
        assert!((p.diffusion_alpha() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_substance_copies_fields() {
        let s = Substance {
            timestep: 0.2,
            viscosity: 0.0002,
            gravity: -3.0,
            iterations: 40,
            color: [1, 2, 3],
            matter_state: MatterState::Gas,
        };
        let p = SolverParams::from_substance(32, &s);
        assert_eq!(p.grid_size, 32);
        assert_eq!(p.dt, 0.2);
        assert_eq!(p.visc, 0.0002);
        assert_eq!(p.iterations, 40);
        assert_eq!(p.gravity, -3.0);
        assert_eq!(p.matter_state, MatterState::Gas);
    }
}
