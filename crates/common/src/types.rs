use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Orientation {
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite() && self.roll.is_finite()
    }
}

/// The camera's position and orientation: the only piece of simulation state.
///
/// `Copy` on purpose. A snapshot is a value, never a reference into live state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewpoint {
    pub position: Vec3,
    pub orientation: Orientation,
}

impl Viewpoint {
    /// Standing at eye height 1 above the origin, looking down -Z.
    pub const START: Viewpoint = Viewpoint {
        position: Vec3::new(0.0, 1.0, 0.0),
        orientation: Orientation {
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
        },
    };
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::START
    }
}

/// Discrete, frame-independent step requested over the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementCommand {
    /// +1 on X.
    StepForward,
    /// -1 on X.
    StepBack,
    /// -1 on Z.
    StepLeft,
    /// +1 on Z.
    StepRight,
    NoOp,
}

impl MovementCommand {
    /// Map a wire code onto a command. Unknown codes are `NoOp`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::StepForward,
            2 => Self::StepLeft,
            3 => Self::StepRight,
            4 => Self::StepBack,
            _ => Self::NoOp,
        }
    }

    /// The wire code a client sends to request this command.
    pub fn code(self) -> u8 {
        match self {
            Self::NoOp => 0,
            Self::StepForward => 1,
            Self::StepLeft => 2,
            Self::StepRight => 3,
            Self::StepBack => 4,
        }
    }

    /// World-space displacement of one step.
    pub fn offset(self) -> Vec3 {
        match self {
            Self::StepForward => Vec3::X,
            Self::StepBack => Vec3::NEG_X,
            Self::StepLeft => Vec3::NEG_Z,
            Self::StepRight => Vec3::Z,
            Self::NoOp => Vec3::ZERO,
        }
    }
}

/// Pointer-derived rotation for one frame, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LookDelta {
    pub d_yaw: f32,
    pub d_pitch: f32,
}

impl LookDelta {
    pub fn is_finite(&self) -> bool {
        self.d_yaw.is_finite() && self.d_pitch.is_finite()
    }

    pub fn is_zero(&self) -> bool {
        self.d_yaw == 0.0 && self.d_pitch == 0.0
    }
}

/// One tick worth of local input, ready for the mutator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContinuousInput {
    pub move_dx: f32,
    pub move_dz: f32,
    pub look: LookDelta,
}

impl ContinuousInput {
    pub fn is_idle(&self) -> bool {
        self.move_dx == 0.0 && self.move_dz == 0.0 && self.look.is_zero()
    }
}
