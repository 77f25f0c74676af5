//! Query backends.
//!
//! `timestamp` measures elapsed time on wgpu devices with a pair of timestamp
//! writes per query, read back through an asynchronously mapped buffer.

mod timestamp;

pub use timestamp::{
    required_features, timestamp_queries_supported, DeviceTimestampGate, TimestampQuery,
    WgpuTimerBackend,
};
