use std::collections::VecDeque;
use vantage_common::Viewpoint;
use vantage_input::InputSampler;
use vantage_kernel::ViewpointMutator;

/// Where a tick's frame goes: a window, or a headless sink.
pub trait FrameTarget {
    type Error;

    /// Render `viewpoint` and present it.
    fn draw(&mut self, viewpoint: &Viewpoint) -> Result<(), Self::Error>;

    /// Grab or release the pointer.
    fn set_pointer_lock(&mut self, locked: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Running,
    Stopped,
}

/// Events handled at the start of the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Window close or process quit.
    CloseRequested,
    EscapePressed,
    TogglePointerLock,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A frame was drawn from this snapshot.
    Rendered(Viewpoint),
    Stopped,
}

/// Running/Stopped state machine driving one frame per tick.
#[derive(Debug)]
pub struct FrameScheduler {
    state: SchedulerState,
    pointer_locked: bool,
    pending: VecDeque<LifecycleEvent>,
    frames: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Starts `Running` with the pointer locked.
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Running,
            pointer_locked: true,
            pending: VecDeque::new(),
            frames: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Queue a lifecycle event; it takes effect at the start of the next tick.
    pub fn push_event(&mut self, event: LifecycleEvent) {
        if self.is_running() {
            self.pending.push_back(event);
        }
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Run one tick: lifecycle events, local input, snapshot, draw.
    pub fn tick<T: FrameTarget>(
        &mut self,
        sampler: &mut InputSampler,
        mutator: &ViewpointMutator,
        target: &mut T,
    ) -> Result<TickOutcome, T::Error> {
        if self.handle_events(target) == SchedulerState::Stopped {
            return Ok(TickOutcome::Stopped);
        }

        if !self.pointer_locked {
            sampler.discard_pointer();
        }
        let yaw = mutator.snapshot().orientation.yaw;
        mutator.apply_continuous(sampler.sample(yaw));

        let snapshot = mutator.snapshot();
        target.draw(&snapshot)?;
        self.frames += 1;
        Ok(TickOutcome::Rendered(snapshot))
    }

    /// Apply queued lifecycle events without drawing.
    ///
    /// `tick` does this first; callers that may not get a tick soon (a hidden
    /// window gets no redraws) call it directly so quit still takes effect.
    pub fn handle_events<T: FrameTarget>(&mut self, target: &mut T) -> SchedulerState {
        while let Some(event) = self.pending.pop_front() {
            match event {
                LifecycleEvent::CloseRequested | LifecycleEvent::EscapePressed => {
                    tracing::info!(?event, frames = self.frames, "frame scheduler stopping");
                    self.state = SchedulerState::Stopped;
                    if self.pointer_locked {
                        self.pointer_locked = false;
                        target.set_pointer_lock(false);
                    }
                    self.pending.clear();
                }
                LifecycleEvent::TogglePointerLock => {
                    self.pointer_locked = !self.pointer_locked;
                    tracing::debug!(locked = self.pointer_locked, "pointer lock toggled");
                    target.set_pointer_lock(self.pointer_locked);
                }
            }
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::convert::Infallible;
    use vantage_common::MovementCommand;
    use vantage_input::MoveKey;

    #[derive(Default)]
    struct Recorder {
        drawn: Vec<Viewpoint>,
        locks: Vec<bool>,
    }

    impl FrameTarget for Recorder {
        type Error = Infallible;

        fn draw(&mut self, viewpoint: &Viewpoint) -> Result<(), Infallible> {
            self.drawn.push(*viewpoint);
            Ok(())
        }

        fn set_pointer_lock(&mut self, locked: bool) {
            self.locks.push(locked);
        }
    }

    struct Failing;

    impl FrameTarget for Failing {
        type Error = &'static str;

        fn draw(&mut self, _: &Viewpoint) -> Result<(), &'static str> {
            Err("surface lost")
        }

        fn set_pointer_lock(&mut self, _: bool) {}
    }

    fn setup() -> (FrameScheduler, InputSampler, ViewpointMutator, Recorder) {
        (
            FrameScheduler::new(),
            InputSampler::new(20.0, 10.0),
            ViewpointMutator::new(),
            Recorder::default(),
        )
    }

    #[test]
    fn idle_tick_draws_current_snapshot() {
        let (mut s, mut input, m, mut target) = setup();
        let out = s.tick(&mut input, &m, &mut target).unwrap();
        assert_eq!(out, TickOutcome::Rendered(Viewpoint::START));
        assert_eq!(target.drawn, vec![Viewpoint::START]);
        assert_eq!(s.frames(), 1);
    }

    #[test]
    fn escape_stops_and_releases_pointer() {
        let (mut s, mut input, m, mut target) = setup();
        s.tick(&mut input, &m, &mut target).unwrap();
        s.push_event(LifecycleEvent::EscapePressed);

        let out = s.tick(&mut input, &m, &mut target).unwrap();
        assert_eq!(out, TickOutcome::Stopped);
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert!(!s.pointer_locked());
        assert_eq!(target.locks, vec![false]);

        // Stopped is terminal: nothing more is drawn.
        assert_eq!(s.tick(&mut input, &m, &mut target).unwrap(), TickOutcome::Stopped);
        assert_eq!(target.drawn.len(), 1);
    }

    #[test]
    fn close_requested_stops_before_drawing() {
        let (mut s, mut input, m, mut target) = setup();
        s.push_event(LifecycleEvent::CloseRequested);
        assert_eq!(s.tick(&mut input, &m, &mut target).unwrap(), TickOutcome::Stopped);
        assert!(target.drawn.is_empty());
    }

    #[test]
    fn pending_close_is_handled_without_drawing() {
        let (mut s, mut input, m, mut target) = setup();
        s.push_event(LifecycleEvent::CloseRequested);
        assert!(s.has_pending_events());

        assert_eq!(s.handle_events(&mut target), SchedulerState::Stopped);
        assert!(!s.has_pending_events());
        assert!(target.drawn.is_empty());
        assert_eq!(target.locks, vec![false]);
        assert_eq!(s.tick(&mut input, &m, &mut target).unwrap(), TickOutcome::Stopped);
    }

    #[test]
    fn handling_nothing_keeps_running() {
        let (mut s, _, _, mut target) = setup();
        assert_eq!(s.handle_events(&mut target), SchedulerState::Running);
        assert!(target.locks.is_empty());
    }

    #[test]
    fn events_after_stop_are_ignored() {
        let (mut s, mut input, m, mut target) = setup();
        s.push_event(LifecycleEvent::CloseRequested);
        s.push_event(LifecycleEvent::TogglePointerLock);
        s.tick(&mut input, &m, &mut target).unwrap();
        s.push_event(LifecycleEvent::TogglePointerLock);
        assert!(!s.has_pending_events());
        assert_eq!(target.locks, vec![false]);
    }

    #[test]
    fn pointer_lock_toggles() {
        let (mut s, mut input, m, mut target) = setup();
        s.push_event(LifecycleEvent::TogglePointerLock);
        s.tick(&mut input, &m, &mut target).unwrap();
        assert!(!s.pointer_locked());
        s.push_event(LifecycleEvent::TogglePointerLock);
        s.tick(&mut input, &m, &mut target).unwrap();
        assert!(s.pointer_locked());
        assert_eq!(target.locks, vec![false, true]);
    }

    #[test]
    fn pointer_motion_ignored_while_unlocked() {
        let (mut s, mut input, m, mut target) = setup();
        s.push_event(LifecycleEvent::TogglePointerLock);
        input.pointer_moved(100.0, 0.0);
        s.tick(&mut input, &m, &mut target).unwrap();
        assert_eq!(m.snapshot().orientation.yaw, 0.0);
    }

    #[test]
    fn pointer_motion_turns_camera_while_locked() {
        let (mut s, mut input, m, mut target) = setup();
        input.pointer_moved(100.0, -20.0);
        let out = s.tick(&mut input, &m, &mut target).unwrap();
        let TickOutcome::Rendered(v) = out else {
            panic!("expected a frame");
        };
        assert_eq!(v.orientation.yaw, -10.0);
        assert_eq!(v.orientation.pitch, 2.0);
    }

    /// Movement is per tick: N ticks with W held move N steps, however long
    /// those ticks took.
    #[test]
    fn displacement_scales_with_tick_count() {
        let (mut s, mut input, m, mut target) = setup();
        input.set_key(MoveKey::Forward, true);
        for _ in 0..20 {
            s.tick(&mut input, &m, &mut target).unwrap();
        }
        let z = m.snapshot().position.z;
        assert!((z - (-1.0)).abs() < 1e-4, "z = {z}");

        for _ in 0..20 {
            s.tick(&mut input, &m, &mut target).unwrap();
        }
        let z = m.snapshot().position.z;
        assert!((z - (-2.0)).abs() < 1e-4, "z = {z}");
    }

    #[test]
    fn remote_commands_between_ticks_show_in_next_frame() {
        let (mut s, mut input, m, mut target) = setup();
        let remote = m.clone();
        remote.apply_discrete(MovementCommand::StepLeft);
        remote.apply_discrete(MovementCommand::StepForward);
        s.tick(&mut input, &m, &mut target).unwrap();
        assert_eq!(target.drawn[0].position, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn draw_errors_propagate() {
        let mut s = FrameScheduler::new();
        let mut input = InputSampler::new(20.0, 10.0);
        let m = ViewpointMutator::new();
        assert_eq!(s.tick(&mut input, &m, &mut Failing), Err("surface lost"));
        assert_eq!(s.frames(), 0);
    }
}
