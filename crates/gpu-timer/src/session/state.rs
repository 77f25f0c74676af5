use crate::error::TimerError;
use crate::pending::PendingEntry;
use crate::query::{QueryBackend, QueryPool};

use super::{SessionInfo, TimerCallback};

/// Whether a session is currently open.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Active,
}

struct ActiveSession<Q> {
    query: Q,
    info: SessionInfo,
}

/// Begin/end state machine.
///
/// The only owner of "what is currently being measured". At most one session
/// is active; misuse is rejected before any pool or backend call is made.
pub struct TimerSession<Q> {
    active: Option<ActiveSession<Q>>,
}

impl<Q> TimerSession<Q> {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    /// Opens a session: stamps the CPU start time, takes a query from the pool
    /// and issues the GPU start command.
    pub fn begin<B>(
        &mut self,
        mut info: SessionInfo,
        now: f64,
        pool: &mut QueryPool<Q>,
        backend: &mut B,
    ) -> Result<(), TimerError>
    where
        B: QueryBackend<Query = Q>,
    {
        if self.active.is_some() {
            return Err(TimerError::ReentrantSession);
        }

        info.mark_started(now);
        let mut query = pool.allocate(backend);
        backend.begin_query(&mut query);

        self.active = Some(ActiveSession { query, info });
        Ok(())
    }

    /// Closes the session: computes `cpu_time`, issues the GPU stop command and
    /// hands back the entry to be queued for polling.
    pub fn end<B>(
        &mut self,
        now: f64,
        backend: &mut B,
        callback: Option<TimerCallback>,
    ) -> Result<PendingEntry<Q>, TimerError>
    where
        B: QueryBackend<Query = Q>,
    {
        let Some(ActiveSession { mut query, mut info }) = self.active.take() else {
            return Err(TimerError::InvalidState);
        };

        info.mark_ended(now);
        backend.end_query(&mut query);

        Ok(PendingEntry::new(query, info, callback))
    }
}

impl<Q> Default for TimerSession<Q> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{SimBackend, SimCommand};

    fn open_info<Q>(session: &TimerSession<Q>) -> Option<&SessionInfo> {
        session.active.as_ref().map(|a| &a.info)
    }

    #[test]
    fn begin_then_end_issues_bracketing_commands() {
        let (mut backend, gpu) = SimBackend::new();
        let mut pool = QueryPool::new();
        let mut session = TimerSession::new();

        session
            .begin(SessionInfo::labeled("frame"), 1000.0, &mut pool, &mut backend)
            .unwrap();
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(open_info(&session).and_then(|i| i.cpu_start_time()), Some(1000.0));

        let entry = session.end(1042.5, &mut backend, None).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(entry.info().cpu_time, Some(42.5));
        assert_eq!(entry.info().cpu_start_time(), None);

        let q = *entry.query();
        assert_eq!(gpu.commands(), vec![SimCommand::Begin(q), SimCommand::End(q)]);
    }

    #[test]
    fn reentrant_begin_is_rejected_and_session_stays_active() {
        let (mut backend, gpu) = SimBackend::new();
        let mut pool = QueryPool::new();
        let mut session = TimerSession::new();

        session.begin(SessionInfo::labeled("outer"), 0.0, &mut pool, &mut backend).unwrap();
        let err = session
            .begin(SessionInfo::labeled("inner"), 1.0, &mut pool, &mut backend)
            .unwrap_err();

        assert_eq!(err, TimerError::ReentrantSession);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(open_info(&session).and_then(|i| i.label.as_deref()), Some("outer"));
        assert_eq!(pool.stats().created, 1);
        assert_eq!(gpu.commands().len(), 1);
    }

    #[test]
    fn end_without_begin_is_rejected_and_session_stays_idle() {
        let (mut backend, gpu) = SimBackend::new();
        let mut session: TimerSession<_> = TimerSession::new();

        let err = session.end(5.0, &mut backend, None).unwrap_err();

        assert_eq!(err, TimerError::InvalidState);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(gpu.commands().is_empty());
    }
}
