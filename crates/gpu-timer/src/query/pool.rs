use super::QueryBackend;

/// Snapshot of pool membership.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PoolStats {
    /// Handles currently sitting in the free-list.
    pub free: usize,
    /// Handles ever created. Never decreases.
    pub created: usize,
}

/// Free-list of reusable query handles.
///
/// Performance characteristics:
/// - `allocate()` is O(1) and only reaches the backend when the free-list is empty
/// - handles are recycled, never destroyed
#[derive(Debug)]
pub struct QueryPool<Q> {
    free: Vec<Q>,
    created: usize,
}

impl<Q> QueryPool<Q> {
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            created: 0,
        }
    }

    /// Pops a recycled handle, or creates one through `backend`.
    pub fn allocate<B>(&mut self, backend: &mut B) -> Q
    where
        B: QueryBackend<Query = Q>,
    {
        if let Some(query) = self.free.pop() {
            return query;
        }

        let query = backend.create_query();
        self.created += 1;
        log::debug!("created timer query #{}", self.created);
        query
    }

    /// Returns a handle whose result has been fully consumed.
    pub fn free(&mut self, query: Q) {
        debug_assert!(self.free.len() < self.created, "freed more queries than were created");
        self.free.push(query);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            free: self.free.len(),
            created: self.created,
        }
    }
}

impl<Q> Default for QueryPool<Q> {
    fn default() -> Self {
        Self::new()
    }
}
