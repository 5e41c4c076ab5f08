//! Shared types for the vantage simulator: the viewpoint, the commands that
//! move it, and the fixed configuration.

pub mod config;
pub mod types;

pub use config::SimulatorConfig;
pub use types::{ContinuousInput, LookDelta, MovementCommand, Orientation, Viewpoint};
