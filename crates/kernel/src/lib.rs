//! Viewpoint kernel: the single synchronization boundary around the camera.
//!
//! # Invariants
//! - All viewpoint mutations flow through [`ViewpointMutator`].
//! - A snapshot is always a state that existed at some instant.
//! - Orientation stays finite.

pub mod mutator;

pub use mutator::ViewpointMutator;
