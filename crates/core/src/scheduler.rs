//! Timer scheduling abstraction and a deterministic timer queue.
//!
//! The session never sleeps or spawns threads. It asks a [`Scheduler`] for
//! repeating and one-shot timers and later drains whatever is due. The
//! [`TimerQueue`] implementation keeps its own millisecond clock that only
//! moves when the caller says so: the terminal loop feeds it wall-clock
//! deltas, tests feed it exact numbers.

/// Identifies an installed timer so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Source of timed events.
pub trait Scheduler<E> {
    /// Fire `event` every `interval_ms`, first after one interval.
    fn schedule_every(&mut self, interval_ms: u32, event: E) -> TimerHandle;

    /// Fire `event` once after `delay_ms` (0 means "at the next drain").
    fn schedule_once(&mut self, delay_ms: u32, event: E) -> TimerHandle;

    /// Remove a timer. Returns false when it already fired or was cancelled.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Pop the earliest timer due at or before `until_ms`, moving the clock to
    /// its deadline.
    fn pop_due(&mut self, until_ms: u64) -> Option<E>;

    /// Current clock reading.
    fn now_ms(&self) -> u64;

    /// Move the clock forward to `ms` (never backwards).
    fn advance_to(&mut self, ms: u64);
}

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: TimerHandle,
    due_ms: u64,
    /// `Some` for repeating timers.
    interval_ms: Option<u32>,
    event: E,
}

/// Manually clocked timer queue.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now_ms: u64,
    next_id: u64,
    timers: Vec<Timer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Number of installed timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    /// Drop every timer.
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    fn install(&mut self, delay_ms: u32, interval_ms: Option<u32>, event: E) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        self.timers.push(Timer {
            handle,
            due_ms: self.now_ms + delay_ms as u64,
            interval_ms,
            event,
        });
        handle
    }
}

impl<E: Clone> Scheduler<E> for TimerQueue<E> {
    fn schedule_every(&mut self, interval_ms: u32, event: E) -> TimerHandle {
        // A zero interval would fire forever within one drain.
        let interval_ms = interval_ms.max(1);
        self.install(interval_ms, Some(interval_ms), event)
    }

    fn schedule_once(&mut self, delay_ms: u32, event: E) -> TimerHandle {
        self.install(delay_ms, None, event)
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    fn pop_due(&mut self, until_ms: u64) -> Option<E> {
        // Earliest deadline first; equal deadlines fire in install order.
        let idx = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.handle))
            .map(|(i, _)| i)?;

        let due_ms = self.timers[idx].due_ms;
        self.now_ms = self.now_ms.max(due_ms);

        match self.timers[idx].interval_ms {
            Some(interval) => {
                let timer = &mut self.timers[idx];
                timer.due_ms += interval as u64;
                Some(timer.event.clone())
            }
            None => Some(self.timers.swap_remove(idx).event),
        }
    }

    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn advance_to(&mut self, ms: u64) {
        self.now_ms = self.now_ms.max(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(q: &mut TimerQueue<&'static str>, until: u64) -> Vec<&'static str> {
        let mut out = Vec::new();
        while let Some(e) = q.pop_due(until) {
            out.push(e);
        }
        q.advance_to(until);
        out
    }

    #[test]
    fn one_shot_fires_once_at_deadline() {
        let mut q = TimerQueue::new();
        q.schedule_once(900, "advance");
        assert!(drain(&mut q, 899).is_empty());
        assert_eq!(drain(&mut q, 900), vec!["advance"]);
        assert!(drain(&mut q, 5000).is_empty());
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn repeating_timer_fires_every_interval() {
        let mut q = TimerQueue::new();
        q.schedule_every(700, "step");
        assert_eq!(drain(&mut q, 2100), vec!["step", "step", "step"]);
        assert_eq!(q.now_ms(), 2100);
        assert_eq!(q.pending(), 1);
    }

    #[test]
    fn events_come_out_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule_once(500, "b");
        q.schedule_every(200, "a");
        q.schedule_once(0, "now");
        assert_eq!(drain(&mut q, 600), vec!["now", "a", "a", "b", "a"]);
    }

    #[test]
    fn cancel_stops_future_fires() {
        let mut q = TimerQueue::new();
        let h = q.schedule_every(1000, "tick");
        assert_eq!(drain(&mut q, 1000), vec!["tick"]);
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(!q.is_pending(h));
        assert!(drain(&mut q, 10_000).is_empty());
    }

    #[test]
    fn cancel_between_pops_takes_effect() {
        let mut q = TimerQueue::new();
        let h = q.schedule_every(100, "x");
        assert_eq!(q.pop_due(1000), Some("x"));
        q.cancel(h);
        assert_eq!(q.pop_due(1000), None);
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q: TimerQueue<&'static str> = TimerQueue::new();
        q.advance_to(50);
        q.advance_to(10);
        assert_eq!(q.now_ms(), 50);
        q.schedule_once(10, "late");
        assert_eq!(drain(&mut q, 59), Vec::<&str>::new());
        assert_eq!(drain(&mut q, 60), vec!["late"]);
    }
}
