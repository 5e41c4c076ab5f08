//! Local input: held movement keys and pointer motion, sampled once per tick.
//!
//! # Invariants
//! - Produces the same continuous input type the kernel consumes; never
//!   touches the viewpoint itself.
//! - Platform neutral. Window backends map their key codes onto [`MoveKey`].

pub mod sampler;

pub use sampler::{InputSampler, MoveKey};
