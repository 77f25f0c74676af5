//! Simulated GPU and tick source for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::query::QueryBackend;
use crate::tick::TickSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimQuery(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    Begin(SimQuery),
    End(SimQuery),
}

#[derive(Default)]
struct SimState {
    next_id: u32,
    commands: Vec<SimCommand>,
    ready: HashMap<SimQuery, u64>,
    maintain_calls: usize,
}

/// Test-side handle onto the simulated device.
#[derive(Clone)]
pub struct SimGpu {
    state: Rc<RefCell<SimState>>,
}

impl SimGpu {
    /// Makes `query`'s result available with the given nanosecond reading.
    pub fn resolve(&self, query: SimQuery, nanos: u64) {
        self.state.borrow_mut().ready.insert(query, nanos);
    }

    pub fn commands(&self) -> Vec<SimCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn maintain_calls(&self) -> usize {
        self.state.borrow().maintain_calls
    }

    /// Query opened by the most recent `Begin` command.
    pub fn last_begun(&self) -> Option<SimQuery> {
        self.state.borrow().commands.iter().rev().find_map(|c| match c {
            SimCommand::Begin(q) => Some(*q),
            SimCommand::End(_) => None,
        })
    }
}

pub struct SimBackend {
    state: Rc<RefCell<SimState>>,
}

impl SimBackend {
    pub fn new() -> (Self, SimGpu) {
        let state = Rc::new(RefCell::new(SimState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            SimGpu { state },
        )
    }
}

impl QueryBackend for SimBackend {
    type Query = SimQuery;

    fn create_query(&mut self) -> SimQuery {
        let mut state = self.state.borrow_mut();
        let query = SimQuery(state.next_id);
        state.next_id += 1;
        query
    }

    fn begin_query(&mut self, query: &mut SimQuery) {
        self.state.borrow_mut().commands.push(SimCommand::Begin(*query));
    }

    fn end_query(&mut self, query: &mut SimQuery) {
        self.state.borrow_mut().commands.push(SimCommand::End(*query));
    }

    fn is_result_available(&mut self, query: &mut SimQuery) -> bool {
        self.state.borrow().ready.contains_key(query)
    }

    fn result(&mut self, query: &mut SimQuery) -> u64 {
        self.state
            .borrow_mut()
            .ready
            .remove(query)
            .expect("result read before it was available")
    }

    fn maintain(&mut self) {
        self.state.borrow_mut().maintain_calls += 1;
    }
}

/// Counts tick requests. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct RecordingTicker {
    count: Rc<Cell<usize>>,
}

impl RecordingTicker {
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl TickSource for RecordingTicker {
    fn schedule_next_tick(&mut self) {
        self.count.set(self.count.get() + 1);
    }
}
