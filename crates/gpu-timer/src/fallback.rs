//! Fixed-delay delivery used when hardware queries are unavailable.

use crate::session::TimerCallback;

/// Default delay before a fallback callback fires, in milliseconds.
pub const DEFAULT_FALLBACK_DELAY_MS: f64 = 100.0;

struct Delayed {
    deadline: f64,
    callback: TimerCallback,
}

/// Callbacks waiting for their deadline.
///
/// Drained by the poll loop, so fallback delivery shares the scheduler with
/// hardware results and fires on the same logical thread.
#[derive(Default)]
pub struct FallbackQueue {
    waiting: Vec<Delayed>,
}

impl FallbackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: f64, delay_ms: f64, callback: TimerCallback) {
        self.waiting.push(Delayed {
            deadline: now + delay_ms.max(0.0),
            callback,
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waiting.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty()
    }

    /// Removes and returns every callback whose deadline is at or before `now`,
    /// in scheduling order.
    pub fn take_due(&mut self, now: f64) -> Vec<TimerCallback> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.waiting.len() {
            if self.waiting[i].deadline <= now {
                due.push(self.waiting.remove(i).callback);
            } else {
                i += 1;
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionInfo;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> TimerCallback {
        let log = Rc::clone(log);
        Box::new(move |info: Option<SessionInfo>| {
            assert!(info.is_none());
            log.borrow_mut().push(name);
        })
    }

    #[test]
    fn fires_only_after_deadline() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = FallbackQueue::new();
        queue.schedule(0.0, DEFAULT_FALLBACK_DELAY_MS, recorder(&log, "a"));

        assert!(queue.take_due(99.9).is_empty());
        for cb in queue.take_due(100.0) {
            cb(None);
        }

        assert_eq!(*log.borrow(), vec!["a"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn due_callbacks_keep_scheduling_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = FallbackQueue::new();
        queue.schedule(0.0, 50.0, recorder(&log, "late"));
        queue.schedule(0.0, 10.0, recorder(&log, "early"));
        queue.schedule(0.0, 500.0, recorder(&log, "later"));

        for cb in queue.take_due(60.0) {
            cb(None);
        }

        assert_eq!(*log.borrow(), vec!["late", "early"]);
        assert_eq!(queue.len(), 1);
    }
}
