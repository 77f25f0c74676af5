//! Timed sessions.
//!
//! A session is one begin/end bracket. `SessionInfo` is the record delivered to
//! the caller; `TimerSession` is the single-active-session state machine.

mod info;
mod state;

pub use info::{SessionInfo, TimerCallback};
pub use state::{SessionState, TimerSession};
