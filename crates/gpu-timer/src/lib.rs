//! GPU timer crate.
//!
//! Brackets a span of GPU work with `begin_timer` / `end_timer` and delivers,
//! some frames later, both the CPU wall-clock duration and the GPU-reported
//! elapsed time for that span. Nothing here ever blocks on the GPU: results are
//! drained by a poll loop driven from the render loop's per-frame tick.
//!
//! One [`TimerService`] is owned per rendering context (window / device).

pub mod backend;
pub mod capability;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod pending;
pub mod poll;
pub mod query;
pub mod service;
pub mod session;
pub mod tick;
pub mod time;

#[cfg(test)]
mod testing;

pub use capability::CapabilityGate;
pub use error::TimerError;
pub use query::{PoolStats, QueryBackend, QueryPool};
pub use service::{TimerConfig, TimerService};
pub use session::{SessionInfo, SessionState, TimerCallback};
pub use tick::{FrameTicker, TickSource};
pub use time::{ClockSource, ManualClock, SystemClock};
