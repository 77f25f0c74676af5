use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};

use crate::capability::CapabilityGate;
use crate::query::QueryBackend;

/// Device features needed to write timestamps between passes.
pub fn required_features() -> wgpu::Features {
    wgpu::Features::TIMESTAMP_QUERY | wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS
}

/// Returns whether `device` was created with [`required_features`].
pub fn timestamp_queries_supported(device: &wgpu::Device) -> bool {
    device.features().contains(required_features())
}

/// Capability gate backed by a device's enabled features.
#[derive(Debug, Clone)]
pub struct DeviceTimestampGate {
    device: wgpu::Device,
}

impl CapabilityGate for DeviceTimestampGate {
    fn supported(&self) -> bool {
        timestamp_queries_supported(&self.device)
    }
}

// Read-back buffer state, written from the map callback.
const MAP_IDLE: u8 = 0;
const MAP_PENDING: u8 = 1;
const MAP_READY: u8 = 2;
const MAP_FAILED: u8 = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct TimestampPair {
    start: u64,
    end: u64,
}

impl TimestampPair {
    const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as _;

    /// Tick delta scaled by the queue's timestamp period (ns per tick).
    fn elapsed_nanos(&self, period_ns: f32) -> u64 {
        let ticks = self.end.saturating_sub(self.start);
        (ticks as f64 * period_ns as f64).round() as u64
    }
}

/// One elapsed-time query: two timestamp slots plus resolve and read-back buffers.
#[derive(Debug)]
pub struct TimestampQuery {
    set: wgpu::QuerySet,
    resolve: wgpu::Buffer,
    readback: wgpu::Buffer,
    map_state: Arc<AtomicU8>,
}

/// wgpu implementation of [`QueryBackend`].
///
/// `begin_query` and `end_query` each submit a small command buffer, so the
/// measured span is whatever the caller submits to the same queue in between.
/// Results are read through `map_async`; `maintain` pumps the device without
/// waiting.
pub struct WgpuTimerBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    period_ns: f32,
}

impl WgpuTimerBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            period_ns: queue.get_timestamp_period(),
        }
    }

    /// Capability gate for the device this backend records on.
    pub fn gate(&self) -> DeviceTimestampGate {
        DeviceTimestampGate {
            device: self.device.clone(),
        }
    }

    fn submit<F>(&self, label: &str, record: F)
    where
        F: FnOnce(&mut wgpu::CommandEncoder),
    {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        record(&mut encoder);
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl QueryBackend for WgpuTimerBackend {
    type Query = TimestampQuery;

    fn create_query(&mut self) -> TimestampQuery {
        let set = self.device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("gpu-timer query set"),
            ty: wgpu::QueryType::Timestamp,
            count: 2,
        });

        let resolve = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu-timer resolve buffer"),
            size: TimestampPair::SIZE,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let readback = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gpu-timer readback buffer"),
            size: TimestampPair::SIZE,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        TimestampQuery {
            set,
            resolve,
            readback,
            map_state: Arc::new(AtomicU8::new(MAP_IDLE)),
        }
    }

    fn begin_query(&mut self, query: &mut TimestampQuery) {
        self.submit("gpu-timer begin", |encoder| {
            encoder.write_timestamp(&query.set, 0);
        });
    }

    fn end_query(&mut self, query: &mut TimestampQuery) {
        self.submit("gpu-timer end", |encoder| {
            encoder.write_timestamp(&query.set, 1);
            encoder.resolve_query_set(&query.set, 0..2, &query.resolve, 0);
            encoder.copy_buffer_to_buffer(&query.resolve, 0, &query.readback, 0, TimestampPair::SIZE);
        });

        query.map_state.store(MAP_PENDING, Ordering::Release);
        let state = Arc::clone(&query.map_state);
        query
            .readback
            .slice(..)
            .map_async(wgpu::MapMode::Read, move |result| {
                let next = if result.is_ok() { MAP_READY } else { MAP_FAILED };
                state.store(next, Ordering::Release);
            });
    }

    fn is_result_available(&mut self, query: &mut TimestampQuery) -> bool {
        matches!(query.map_state.load(Ordering::Acquire), MAP_READY | MAP_FAILED)
    }

    fn result(&mut self, query: &mut TimestampQuery) -> u64 {
        if query.map_state.swap(MAP_IDLE, Ordering::AcqRel) != MAP_READY {
            // Nothing is mapped; the query can be reused as is.
            log::warn!("timestamp read-back failed; reporting 0 ns");
            return 0;
        }

        let pair: TimestampPair = {
            let view = query.readback.slice(..).get_mapped_range();
            bytemuck::pod_read_unaligned(&view[..TimestampPair::SIZE as usize])
        };
        query.readback.unmap();

        pair.elapsed_nanos(self.period_ns)
    }

    fn maintain(&mut self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::warn!("device poll failed: {e}");
        }
    }
}
