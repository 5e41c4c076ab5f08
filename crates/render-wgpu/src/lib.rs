//! wgpu render backend for the viewpoint simulator.
//!
//! Draws the ground quad and the four boundary walls with flat colors.
//!
//! # Invariants
//! - Renderer never mutates the viewpoint.
//! - Scene geometry is uploaded once; each frame only writes the camera uniform.

mod context;
mod gpu;
mod shaders;

pub use context::{GpuContext, GpuError};
pub use gpu::WgpuRenderer;
