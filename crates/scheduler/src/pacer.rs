use std::time::{Duration, Instant};

/// Caps a loop at a fixed rate using absolute deadlines.
///
/// After a stall the next deadline restarts from "now" instead of firing a
/// burst of catch-up frames.
#[derive(Debug, Clone)]
pub struct FramePacer {
    period: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(rate_hz: u32, now: Instant) -> Self {
        Self {
            period: Duration::from_secs(1) / rate_hz.max(1),
            next: now,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// When the next frame may start.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Record that a frame started at `now` and schedule the next one.
    pub fn frame_started(&mut self, now: Instant) {
        let next = self.next + self.period;
        self.next = if next <= now { now + self.period } else { next };
    }

    /// Block the current thread until the next deadline.
    pub fn sleep_until_due(&self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
        }
    }
}
