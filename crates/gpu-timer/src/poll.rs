//! Per-tick drain of in-flight queries.

use crate::fallback::FallbackQueue;
use crate::pending::PendingQueryQueue;
use crate::query::{QueryBackend, QueryPool};
use crate::tick::TickSource;

/// Raw query results are nanoseconds; delivered times are milliseconds.
pub const NANOS_PER_MILLI: f64 = 1e6;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PollState {
    /// Nothing pending; no tick requested.
    Idle,
    /// A tick has been requested and will drain the queues.
    Scheduled,
}

/// Outcome of one poll pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct PassReport {
    /// Hardware results delivered during the pass.
    pub resolved: usize,
    /// Fallback callbacks fired during the pass.
    pub fallbacks_fired: usize,
    /// Entries left for a later tick (hardware + fallback).
    pub remaining: usize,
}

/// Drives the poll loop from an external tick source.
///
/// Runs only while something is pending: each pass requests the next tick
/// if work remains and otherwise goes idle until `ensure_running` is called again.
#[derive(Debug)]
pub struct PollScheduler {
    state: PollState,
}

impl PollScheduler {
    pub fn new() -> Self {
        Self {
            state: PollState::Idle,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == PollState::Scheduled
    }

    /// Requests a tick unless one is already outstanding.
    pub fn ensure_running(&mut self, ticker: &mut dyn TickSource) {
        if self.state == PollState::Idle {
            log::debug!("timer poll loop started");
            self.state = PollState::Scheduled;
            ticker.schedule_next_tick();
        }
    }

    /// Runs one pass over both queues.
    ///
    /// Ticks arriving while idle are ignored.
    pub fn run_pass<B>(
        &mut self,
        backend: &mut B,
        pending: &mut PendingQueryQueue<B::Query>,
        pool: &mut QueryPool<B::Query>,
        fallback: &mut FallbackQueue,
        now: f64,
        ticker: &mut dyn TickSource,
    ) -> PassReport
    where
        B: QueryBackend,
    {
        if self.state == PollState::Idle {
            return PassReport::default();
        }

        backend.maintain();

        let resolved = pending.take_resolved(|query| {
            if backend.is_result_available(query) {
                Some(backend.result(query))
            } else {
                None
            }
        });

        let mut report = PassReport {
            resolved: resolved.len(),
            ..PassReport::default()
        };

        for (entry, nanos) in resolved {
            let query = entry.complete(nanos as f64 / NANOS_PER_MILLI);
            pool.free(query);
        }

        for callback in fallback.take_due(now) {
            callback(None);
            report.fallbacks_fired += 1;
        }

        report.remaining = pending.len() + fallback.len();
        if report.remaining > 0 {
            ticker.schedule_next_tick();
        } else {
            log::debug!("timer poll loop idle");
            self.state = PollState::Idle;
        }

        report
    }
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::PendingEntry;
    use crate::session::SessionInfo;
    use crate::testing::{RecordingTicker, SimBackend};

    #[test]
    fn idle_scheduler_ignores_ticks() {
        let (mut backend, gpu) = SimBackend::new();
        let mut pool = QueryPool::new();
        let mut pending = PendingQueryQueue::new();
        let mut fallback = FallbackQueue::new();
        let mut ticker = RecordingTicker::default();
        let mut scheduler = PollScheduler::new();

        let report = scheduler.run_pass(&mut backend, &mut pending, &mut pool, &mut fallback, 0.0, &mut ticker);

        assert_eq!(report, PassReport::default());
        assert_eq!(gpu.maintain_calls(), 0);
        assert_eq!(ticker.count(), 0);
    }

    #[test]
    fn ensure_running_requests_a_single_tick() {
        let mut ticker = RecordingTicker::default();
        let mut scheduler = PollScheduler::new();

        scheduler.ensure_running(&mut ticker);
        scheduler.ensure_running(&mut ticker);

        assert!(scheduler.is_running());
        assert_eq!(ticker.count(), 1);
    }

    #[test]
    fn keeps_ticking_until_queue_drains() {
        let (mut backend, gpu) = SimBackend::new();
        let mut pool = QueryPool::new();
        let mut pending = PendingQueryQueue::new();
        let mut fallback = FallbackQueue::new();
        let mut ticker = RecordingTicker::default();
        let mut scheduler = PollScheduler::new();

        let query = pool.allocate(&mut backend);
        pending.push(PendingEntry::new(query, SessionInfo::new(), None));
        scheduler.ensure_running(&mut ticker);

        let report = scheduler.run_pass(&mut backend, &mut pending, &mut pool, &mut fallback, 0.0, &mut ticker);
        assert_eq!(report.remaining, 1);
        assert!(scheduler.is_running());
        assert_eq!(ticker.count(), 2);

        gpu.resolve(query, 3_000_000);
        let report = scheduler.run_pass(&mut backend, &mut pending, &mut pool, &mut fallback, 0.0, &mut ticker);
        assert_eq!(report.resolved, 1);
        assert_eq!(report.remaining, 0);
        assert_eq!(scheduler.state(), PollState::Idle);
        assert_eq!(ticker.count(), 2);
        assert_eq!(pool.stats().free, 1);
        assert_eq!(gpu.maintain_calls(), 2);
    }
}
