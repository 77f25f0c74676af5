//! Submitted queries awaiting their hardware result.

use std::fmt;

use crate::session::{SessionInfo, TimerCallback};

/// A submitted query paired with its session metadata and completion handle.
pub struct PendingEntry<Q> {
    query: Q,
    info: SessionInfo,
    callback: Option<TimerCallback>,
}

impl<Q> PendingEntry<Q> {
    pub fn new(query: Q, info: SessionInfo, callback: Option<TimerCallback>) -> Self {
        Self { query, info, callback }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// Merges the GPU time and fires the callback, consuming the entry.
    ///
    /// Returns the query so it can go back to the pool.
    pub fn complete(self, gpu_time_ms: f64) -> Q {
        let PendingEntry { query, mut info, callback } = self;
        info.gpu_time = Some(gpu_time_ms);
        if let Some(callback) = callback {
            callback(Some(info));
        }
        query
    }
}

impl<Q: fmt::Debug> fmt::Debug for PendingEntry<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEntry")
            .field("query", &self.query)
            .field("info", &self.info)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Queue of in-flight queries, in submission order.
///
/// Completion order is up to the hardware, so entries are removed wherever
/// they sit rather than only from the front.
pub struct PendingQueryQueue<Q> {
    entries: Vec<PendingEntry<Q>>,
}

impl<Q> PendingQueryQueue<Q> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn push(&mut self, entry: PendingEntry<Q>) {
        self.entries.push(entry);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in submission order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingEntry<Q>> {
        self.entries.iter()
    }

    /// Walks the queue once, removing every entry `resolve` yields a result for.
    ///
    /// `resolve` gets mutable access to the query so backends can poll it.
    /// Removed entries are returned with their result, in submission order;
    /// the rest keep their relative order for the next pass.
    pub fn take_resolved<F, R>(&mut self, mut resolve: F) -> Vec<(PendingEntry<Q>, R)>
    where
        F: FnMut(&mut Q) -> Option<R>,
    {
        let mut resolved = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            match resolve(&mut self.entries[i].query) {
                Some(result) => {
                    let entry = self.entries.remove(i);
                    resolved.push((entry, result));
                }
                None => i += 1,
            }
        }
        resolved
    }
}

impl<Q> Default for PendingQueryQueue<Q> {
    fn default() -> Self {
        Self::new()
    }
}
