use vantage_common::{ContinuousInput, LookDelta};

/// Movement keys the sampler understands (W, S, A, D on a desktop).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Back,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default)]
struct HeldKeys {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
}

/// Collects key state and pointer motion between ticks and turns them into
/// one [`ContinuousInput`] per tick.
///
/// Movement is per tick, not per second: holding a key for N ticks moves the
/// camera N steps regardless of how long those ticks took.
#[derive(Debug, Clone)]
pub struct InputSampler {
    held: HeldKeys,
    pointer_dx: f64,
    pointer_dy: f64,
    velocity: f32,
    sensitivity: f32,
}

impl InputSampler {
    /// `velocity` and `sensitivity` are divisors: higher is slower.
    pub fn new(velocity: f32, sensitivity: f32) -> Self {
        Self {
            held: HeldKeys::default(),
            pointer_dx: 0.0,
            pointer_dy: 0.0,
            velocity,
            sensitivity,
        }
    }

    pub fn set_key(&mut self, key: MoveKey, pressed: bool) {
        let slot = match key {
            MoveKey::Forward => &mut self.held.forward,
            MoveKey::Back => &mut self.held.back,
            MoveKey::Left => &mut self.held.left,
            MoveKey::Right => &mut self.held.right,
        };
        *slot = pressed;
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        match key {
            MoveKey::Forward => self.held.forward,
            MoveKey::Back => self.held.back,
            MoveKey::Left => self.held.left,
            MoveKey::Right => self.held.right,
        }
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held = HeldKeys::default();
    }

    /// Accumulate raw pointer motion until the next sample.
    pub fn pointer_moved(&mut self, dx: f64, dy: f64) {
        self.pointer_dx += dx;
        self.pointer_dy += dy;
    }

    /// Drop accumulated pointer motion without applying it.
    pub fn discard_pointer(&mut self) {
        self.pointer_dx = 0.0;
        self.pointer_dy = 0.0;
    }

    /// Produce this tick's input for a camera currently at `yaw_degrees`.
    /// Clears the pointer accumulator.
    pub fn sample(&mut self, yaw_degrees: f32) -> ContinuousInput {
        let yaw = (-yaw_degrees).to_radians();
        let dx = yaw.sin() / self.velocity;
        let dz = yaw.cos() / self.velocity;

        let (mut move_dx, mut move_dz) = (0.0_f32, 0.0_f32);
        if self.held.forward {
            move_dx += dx;
            move_dz -= dz;
        }
        if self.held.back {
            move_dx -= dx;
            move_dz += dz;
        }
        if self.held.left {
            move_dx -= dz;
            move_dz -= dx;
        }
        if self.held.right {
            move_dx += dz;
            move_dz += dx;
        }

        let look = LookDelta {
            d_yaw: (-self.pointer_dx / self.sensitivity as f64) as f32,
            d_pitch: (-self.pointer_dy / self.sensitivity as f64) as f32,
        };
        self.discard_pointer();

        let input = ContinuousInput {
            move_dx,
            move_dz,
            look,
        };
        if !input.is_idle() {
            tracing::trace!(?input, "sampled local input");
        }
        input
    }
}
