use std::fmt;

/// Misuse of the begin/end state machine.
///
/// Both variants are programmer errors. They are returned before any pool or
/// queue state is touched, so the service stays consistent afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// `begin_timer` was called while a session was already active.
    ReentrantSession,
    /// `end_timer` was called with no active session.
    InvalidState,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::ReentrantSession => {
                f.write_str("begin_timer was called before the previous end_timer")
            }
            TimerError::InvalidState => f.write_str("end_timer was called without a matching begin_timer"),
        }
    }
}

impl std::error::Error for TimerError {}
