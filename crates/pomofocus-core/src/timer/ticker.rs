//! Tick scheduling port for the timer engine.
//!
//! The engine arms a source when it starts counting and disarms it on
//! pause, reset, or completion. The host calls [`super::TimerEngine::tick`]
//! each time an armed source fires; a disarmed source never fires.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait TickSource {
    fn arm(&mut self, interval: Duration);
    fn disarm(&mut self);
    fn is_armed(&self) -> bool;
}

/// Test double: records arming, ticks are delivered by hand.
///
/// Clones share state, so a test can keep one handle while the engine owns
/// the other.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    armed: Rc<Cell<bool>>,
    arm_count: Rc<Cell<u32>>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the source has been armed.
    pub fn arm_count(&self) -> u32 {
        self.arm_count.get()
    }
}

impl TickSource for ManualTicks {
    fn arm(&mut self, _interval: Duration) {
        self.armed.set(true);
        self.arm_count.set(self.arm_count.get() + 1);
    }

    fn disarm(&mut self) {
        self.armed.set(false);
    }

    fn is_armed(&self) -> bool {
        self.armed.get()
    }
}

/// Wall-clock source for a foreground loop.
///
/// Deadlines advance by whole intervals so ticks do not drift with the time
/// spent handling each one. Clones share state: the engine owns one handle
/// and the loop waits on another.
#[derive(Debug, Clone, Default)]
pub struct IntervalTicks {
    interval: Rc<Cell<Duration>>,
    next_deadline: Rc<Cell<Option<Instant>>>,
}

impl IntervalTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left until the next tick, or `None` when disarmed.
    pub fn time_to_next(&self) -> Option<Duration> {
        let deadline = self.next_deadline.get()?;
        Some(deadline.saturating_duration_since(Instant::now()))
    }

    /// Mark the pending tick as delivered and schedule the next one.
    pub fn fired(&self) {
        if let Some(deadline) = self.next_deadline.get() {
            self.next_deadline.set(Some(deadline + self.interval.get()));
        }
    }

    /// Sleep until the next tick is due. Returns `false` when disarmed.
    pub fn wait_next(&self) -> bool {
        let Some(wait) = self.time_to_next() else {
            return false;
        };
        std::thread::sleep(wait);
        self.fired();
        true
    }
}

impl TickSource for IntervalTicks {
    fn arm(&mut self, interval: Duration) {
        self.interval.set(interval);
        self.next_deadline.set(Some(Instant::now() + interval));
    }

    fn disarm(&mut self) {
        self.next_deadline.set(None);
    }

    fn is_armed(&self) -> bool {
        self.next_deadline.get().is_some()
    }
}
