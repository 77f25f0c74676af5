//! Per-frame tick sources driving the poll loop.

use std::cell::Cell;
use std::rc::Rc;

/// Requests one future invocation of [`TimerService::tick`](crate::TimerService::tick).
///
/// Implementations typically map this onto the display refresh (a redraw
/// request). Several requests before the tick fires collapse into one.
pub trait TickSource {
    fn schedule_next_tick(&mut self);
}

impl<F> TickSource for F
where
    F: FnMut(),
{
    fn schedule_next_tick(&mut self) {
        self()
    }
}

/// Tick source backed by a shared flag.
///
/// The service sets the flag; the render loop calls [`FrameTicker::take`] once
/// per frame and, when it returns `true`, calls `TimerService::tick` (and
/// requests a redraw if it otherwise would not).
#[derive(Debug, Clone, Default)]
pub struct FrameTicker {
    requested: Rc<Cell<bool>>,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a tick was requested, clearing the request.
    pub fn take(&self) -> bool {
        self.requested.replace(false)
    }

    /// Returns whether a tick is requested without clearing it.
    pub fn is_requested(&self) -> bool {
        self.requested.get()
    }
}

impl TickSource for FrameTicker {
    fn schedule_next_tick(&mut self) {
        self.requested.set(true);
    }
}
