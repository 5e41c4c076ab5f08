//! Rendering Adapter: renderer-agnostic scene description.
//!
//! # Invariants
//! - Rendering is a pure function of a viewpoint snapshot and static terrain.
//! - Renderers never mutate the viewpoint.
//! - Terrain geometry is computed once from the configured size.

mod camera;
mod renderer;
mod terrain;

pub use camera::{Lens, view_matrix};
pub use renderer::{DebugTextRenderer, Renderer};
pub use terrain::{ColoredVertex, GROUND_COLOR, SKY_COLOR, Terrain, Wall};

pub fn crate_info() -> &'static str {
    "vantage-render v0.1.0"
}
