use parking_lot::Mutex;
use std::sync::Arc;
use vantage_common::{ContinuousInput, MovementCommand, Viewpoint};

/// Guarded state: the viewpoint plus a count of applied mutations.
#[derive(Debug)]
struct Guarded {
    viewpoint: Viewpoint,
    applied: u64,
}

/// The only writer of the viewpoint.
///
/// A cheap cloneable handle. Every clone refers to the same viewpoint, so the
/// frame scheduler and the command channel each hold one without ever touching
/// the viewpoint directly. Writes and snapshot reads share one lock; the
/// critical section is a handful of float adds and never allocates, so a
/// snapshot can never observe half of an update.
#[derive(Debug, Clone)]
pub struct ViewpointMutator {
    inner: Arc<Mutex<Guarded>>,
}

impl Default for ViewpointMutator {
    fn default() -> Self {
        Self::with_viewpoint(Viewpoint::START)
    }
}

impl ViewpointMutator {
    /// Mutator around the start viewpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutator around an arbitrary initial viewpoint.
    pub fn with_viewpoint(viewpoint: Viewpoint) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Guarded {
                viewpoint,
                applied: 0,
            })),
        }
    }

    /// Apply one discrete unit step. `NoOp` leaves the state untouched.
    pub fn apply_discrete(&self, cmd: MovementCommand) {
        if cmd == MovementCommand::NoOp {
            return;
        }
        let offset = cmd.offset();
        let position = {
            let mut guard = self.inner.lock();
            guard.viewpoint.position += offset;
            guard.applied += 1;
            guard.viewpoint.position
        };
        tracing::debug!(?cmd, x = position.x, z = position.z, "discrete step applied");
    }

    /// Apply one tick of local movement and look.
    ///
    /// Non-finite components are discarded so orientation stays finite.
    pub fn apply_continuous(&self, input: ContinuousInput) {
        let move_ok = input.move_dx.is_finite() && input.move_dz.is_finite();
        let look_ok = input.look.is_finite();
        if !move_ok {
            tracing::warn!(?input, "discarding non-finite movement delta");
        }
        if !look_ok {
            tracing::warn!(?input, "discarding non-finite look delta");
        }
        let moves = move_ok && (input.move_dx != 0.0 || input.move_dz != 0.0);
        let turns = look_ok && !input.look.is_zero();
        if !moves && !turns {
            return;
        }

        let mut guard = self.inner.lock();
        let v = &mut guard.viewpoint;
        if moves {
            v.position.x += input.move_dx;
            v.position.z += input.move_dz;
        }
        if turns {
            v.orientation.yaw += input.look.d_yaw;
            v.orientation.pitch += input.look.d_pitch;
        }
        guard.applied += 1;
    }

    /// Consistent copy of the viewpoint as of the moment the lock was held.
    pub fn snapshot(&self) -> Viewpoint {
        self.inner.lock().viewpoint
    }

    /// Number of state-changing commands applied so far.
    pub fn applied(&self) -> u64 {
        self.inner.lock().applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::sync::Barrier;
    use std::thread;
    use vantage_common::LookDelta;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn starts_at_default_viewpoint() {
        let m = ViewpointMutator::new();
        assert_eq!(m.snapshot(), Viewpoint::START);
        assert_eq!(m.applied(), 0);
    }

    #[test]
    fn noop_never_changes_state() {
        let m = ViewpointMutator::new();
        for _ in 0..10 {
            m.apply_discrete(MovementCommand::NoOp);
        }
        assert_eq!(m.snapshot(), Viewpoint::START);
        assert_eq!(m.applied(), 0);
    }

    #[test]
    fn discrete_steps_move_one_unit() {
        let m = ViewpointMutator::new();
        m.apply_discrete(MovementCommand::StepForward);
        assert_eq!(m.snapshot().position, Vec3::new(1.0, 1.0, 0.0));
        m.apply_discrete(MovementCommand::StepLeft);
        assert_eq!(m.snapshot().position, Vec3::new(1.0, 1.0, -1.0));
        m.apply_discrete(MovementCommand::StepRight);
        m.apply_discrete(MovementCommand::StepBack);
        assert_eq!(m.snapshot().position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(m.applied(), 4);
    }

    #[test]
    fn forward_then_back_round_trips_x() {
        let m = ViewpointMutator::new();
        let before = m.snapshot().position.x;
        m.apply_discrete(MovementCommand::StepForward);
        m.apply_discrete(MovementCommand::StepBack);
        assert!(approx(m.snapshot().position.x, before));
    }

    #[test]
    fn continuous_moves_and_turns() {
        let m = ViewpointMutator::new();
        m.apply_continuous(ContinuousInput {
            move_dx: 0.5,
            move_dz: -0.25,
            look: LookDelta {
                d_yaw: 3.0,
                d_pitch: -1.5,
            },
        });
        let v = m.snapshot();
        assert!(approx(v.position.x, 0.5));
        assert!(approx(v.position.z, -0.25));
        assert!(approx(v.orientation.yaw, 3.0));
        assert!(approx(v.orientation.pitch, -1.5));
        assert_eq!(v.orientation.roll, 0.0);
    }

    #[test]
    fn idle_continuous_input_is_not_counted() {
        let m = ViewpointMutator::new();
        m.apply_continuous(ContinuousInput::default());
        assert_eq!(m.applied(), 0);
        assert_eq!(m.snapshot(), Viewpoint::START);
    }

    #[test]
    fn non_finite_look_is_discarded() {
        let m = ViewpointMutator::new();
        m.apply_continuous(ContinuousInput {
            move_dx: 1.0,
            move_dz: 0.0,
            look: LookDelta {
                d_yaw: f32::INFINITY,
                d_pitch: f32::NAN,
            },
        });
        let v = m.snapshot();
        assert!(v.orientation.is_finite());
        assert_eq!(v.orientation.yaw, 0.0);
        assert!(approx(v.position.x, 1.0));
    }

    #[test]
    fn clones_share_state() {
        let a = ViewpointMutator::new();
        let b = a.clone();
        b.apply_discrete(MovementCommand::StepRight);
        assert_eq!(a.snapshot().position.z, 1.0);
    }

    #[test]
    fn concurrent_discrete_commands_are_never_lost() {
        const THREADS: usize = 8;
        const STEPS: usize = 500;
        let m = ViewpointMutator::new();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|i| {
                let m = m.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..STEPS {
                        if i % 2 == 0 {
                            m.apply_discrete(MovementCommand::StepForward);
                        } else {
                            m.apply_discrete(MovementCommand::StepRight);
                        }
                        m.apply_discrete(MovementCommand::NoOp);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let v = m.snapshot();
        let per_axis = (THREADS / 2 * STEPS) as f32;
        assert_eq!(v.position.x, per_axis);
        assert_eq!(v.position.z, per_axis);
        assert_eq!(m.applied(), (THREADS * STEPS) as u64);
    }

    /// Half the producers send remote steps, half send local movement; all of
    /// it lands and every snapshot taken meanwhile is whole.
    #[test]
    fn mixed_discrete_and_continuous_producers() {
        const THREADS: usize = 8;
        const STEPS: usize = 1_000;
        let m = ViewpointMutator::with_viewpoint(Viewpoint {
            position: Vec3::ZERO,
            ..Viewpoint::START
        });
        let barrier = Arc::new(Barrier::new(THREADS + 1));

        let producers: Vec<_> = (0..THREADS)
            .map(|i| {
                let m = m.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..STEPS {
                        if i % 2 == 0 {
                            m.apply_discrete(MovementCommand::StepForward);
                            m.apply_discrete(MovementCommand::StepRight);
                        } else {
                            m.apply_continuous(ContinuousInput {
                                move_dx: 1.0,
                                move_dz: 1.0,
                                look: LookDelta::default(),
                            });
                        }
                    }
                })
            })
            .collect();

        let reader = {
            let m = m.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..10_000 {
                    let v = m.snapshot();
                    assert!(v.position.x.is_finite() && v.position.z.is_finite());
                    assert_eq!(v.position.y, 0.0);
                    assert!(v.orientation.is_finite());
                    // A forward step may be seen without its paired right step,
                    // never the other way round.
                    assert!(v.position.x >= v.position.z, "{v:?}");
                }
            })
        };

        for p in producers {
            p.join().unwrap();
        }
        reader.join().unwrap();

        let v = m.snapshot();
        let expected = (THREADS * STEPS) as f32;
        assert_eq!(v.position.x, expected);
        assert_eq!(v.position.z, expected);
        assert_eq!(m.applied(), (THREADS / 2 * STEPS * 3) as u64);
    }

    /// Writers only ever move x and z together, so any snapshot with x != z
    /// would be a torn read.
    #[test]
    fn snapshots_are_never_torn() {
        const WRITERS: usize = 4;
        const STEPS: usize = 2_000;
        let m = ViewpointMutator::with_viewpoint(Viewpoint {
            position: Vec3::ZERO,
            ..Viewpoint::START
        });
        let barrier = Arc::new(Barrier::new(WRITERS + 1));

        let writers: Vec<_> = (0..WRITERS)
            .map(|_| {
                let m = m.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..STEPS {
                        m.apply_continuous(ContinuousInput {
                            move_dx: 1.0,
                            move_dz: 1.0,
                            look: LookDelta {
                                d_yaw: 1.0,
                                d_pitch: 0.0,
                            },
                        });
                        m.apply_discrete(MovementCommand::NoOp);
                    }
                })
            })
            .collect();

        let reader = {
            let m = m.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut observed = 0usize;
                while observed < 10_000 {
                    let v = m.snapshot();
                    assert_eq!(v.position.x, v.position.z);
                    assert_eq!(v.position.x, v.orientation.yaw);
                    observed += 1;
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();

        let v = m.snapshot();
        assert_eq!(v.position.x, (WRITERS * STEPS) as f32);
        assert_eq!(v.position.z, (WRITERS * STEPS) as f32);
    }
}
