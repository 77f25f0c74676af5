//! Time subsystem.
//!
//! Wall-clock sources used to measure the CPU side of a timed span.
//! Intended usage:
//! - `SystemClock` in real render loops
//! - `ManualClock` wherever timings must be deterministic (tests, replays)

mod clock;

pub use clock::{ClockSource, ManualClock, SystemClock};
