//! Frame Scheduler: drives input sampling, snapshotting and presentation once
//! per tick at a capped rate.
//!
//! # Invariants
//! - `Stopped` is terminal; no frame is drawn after it.
//! - Each tick draws exactly one snapshot taken after local input was applied.
//! - The scheduler reads the viewpoint only through the kernel's mutator.

mod pacer;
mod scheduler;

pub use pacer::FramePacer;
pub use scheduler::{FrameScheduler, FrameTarget, LifecycleEvent, SchedulerState, TickOutcome};
