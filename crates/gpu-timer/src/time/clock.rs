use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic time source, in milliseconds.
///
/// The origin is arbitrary; only differences between two readings are meaningful.
pub trait ClockSource {
    fn now(&self) -> f64;
}

/// Clock backed by `Instant`.
///
/// Readings are milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> f64 {
        Instant::now()
            .saturating_duration_since(self.origin)
            .as_secs_f64()
            * 1000.0
    }
}

/// Manually driven clock.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the service under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    /// Sets the current reading.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Moves the reading forward by `ms`.
    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_clones_share_reading() {
        let clock = ManualClock::new(1000.0);
        let handle = clock.clone();
        handle.advance(42.5);
        assert_eq!(clock.now(), 1042.5);

        handle.set(7.0);
        assert_eq!(clock.now(), 7.0);
    }
}
