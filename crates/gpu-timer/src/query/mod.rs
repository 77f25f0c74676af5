//! GPU timer-query objects.
//!
//! `QueryBackend` is the interface to the hardware; `QueryPool` recycles the
//! query objects it creates so none is ever destroyed while the context lives.

mod backend;
mod pool;

pub use backend::QueryBackend;
pub use pool::{PoolStats, QueryPool};
