//! Frame timeline and deferred single-shot callbacks.
//!
//! Nothing runs on a timer thread. Work scheduled here fires from
//! [`Scheduler::advance`] on the frame that crosses its due time, and can be
//! cancelled any time before that.

use craftbench_core::FrameTick;

/// Frame counter plus accumulated seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameClock {
    /// Current frame.
    pub tick: FrameTick,
    /// Seconds elapsed since the clock started.
    pub elapsed: f64,
}

impl FrameClock {
    /// Clock at frame zero.
    pub fn new() -> Self {
        Self {
            tick: FrameTick::ZERO,
            elapsed: 0.0,
        }
    }

    /// Advance one frame lasting `dt` seconds. Negative deltas are treated as zero.
    pub fn advance(&mut self, dt: f64) {
        self.tick = self.tick.advance(1);
        self.elapsed += dt.max(0.0);
    }
}

/// Handle returned by [`Scheduler::schedule_after`], used to cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    handle: TimerHandle,
    due: f64,
    event: E,
}

/// Queue of one-shot events keyed on the frame clock.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    clock: FrameClock,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Scheduler<E> {
    /// Empty scheduler at frame zero.
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Current clock.
    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    /// Fire `event` once, `delay` seconds from now.
    pub fn schedule_after(&mut self, delay: f64, event: E) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            handle,
            due: self.clock.elapsed + delay.max(0.0),
            event,
        });
        handle
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.handle != handle);
        self.pending.len() != before
    }

    /// Drop every pending event.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Whether `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// Number of events waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance one frame of `dt` seconds and return the events that came due,
    /// earliest first.
    pub fn advance(&mut self, dt: f64) -> Vec<E> {
        self.clock.advance(dt);
        let now = self.clock.elapsed;

        let mut due = Vec::new();
        let mut index = 0;
        while index < self.pending.len() {
            if self.pending[index].due <= now {
                due.push(self.pending.remove(index));
            } else {
                index += 1;
            }
        }

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.handle.0.cmp(&b.handle.0)));
        due.into_iter().map(|p| p.event).collect()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clock_starts_at_frame_zero() {
        assert_eq!(FrameClock::default(), FrameClock::new());
        assert_eq!(FrameClock::default().tick, FrameTick::ZERO);
    }

    #[test]
    fn event_fires_once_after_delay() {
        let mut s = Scheduler::new();
        s.schedule_after(1.5, "reset");

        assert!(s.advance(1.0).is_empty());
        assert_eq!(s.advance(0.5), vec!["reset"]);
        assert!(s.advance(10.0).is_empty());
        assert_eq!(s.clock().tick, FrameTick(3));
    }

    #[test]
    fn cancelled_event_never_fires() {
        let mut s = Scheduler::new();
        let h = s.schedule_after(0.1, 1);
        assert!(s.is_pending(h));
        assert!(s.cancel(h));
        assert!(!s.cancel(h));
        assert!(s.advance(1.0).is_empty());
    }

    #[test]
    fn events_fire_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule_after(0.3, 'b');
        s.schedule_after(0.1, 'a');
        s.schedule_after(5.0, 'c');
        assert_eq!(s.advance(1.0), vec!['a', 'b']);
        assert_eq!(s.pending_count(), 1);
        s.cancel_all();
        assert_eq!(s.pending_count(), 0);
    }
}
