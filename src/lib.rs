pub mod brush;
pub mod config;
pub mod picking;
pub mod settings;
pub mod solver;
pub mod state;
pub mod substance;
