use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use gpu_timer::backend::WgpuTimerBackend;
use gpu_timer::{FrameTicker, SessionInfo, SessionState, TimerConfig, TimerService};

use crate::gpu::{Gpu, GpuInit, SurfaceErrorAction};

/// Window / reporting configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Number of delivered frame timings averaged per log line.
    pub report_every: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "gpu-timer demo".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            report_every: 120,
        }
    }
}

pub fn run(config: DemoConfig, gpu_init: GpuInit, timer_config: TimerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut state = DemoState::new(config, gpu_init, timer_config);

    event_loop
        .run_app(&mut state)
        .context("winit event loop terminated with error")?;

    Ok(())
}

/// Rolling sums of delivered timings.
#[derive(Debug, Default)]
struct TimingLog {
    samples: usize,
    fallback_samples: usize,
    cpu_ms: f64,
    gpu_ms: f64,
}

impl TimingLog {
    fn record(&mut self, info: Option<SessionInfo>, report_every: usize) {
        match info {
            Some(info) => {
                self.samples += 1;
                self.cpu_ms += info.cpu_time.unwrap_or_default();
                self.gpu_ms += info.gpu_time.unwrap_or_default();
            }
            None => self.fallback_samples += 1,
        }

        let total = self.samples + self.fallback_samples;
        if total < report_every.max(1) {
            return;
        }

        if self.samples > 0 {
            let n = self.samples as f64;
            log::info!(
                "frame timings over {} frames: cpu {:.3} ms, gpu {:.3} ms",
                self.samples,
                self.cpu_ms / n,
                self.gpu_ms / n
            );
        } else {
            log::info!("{} frames completed without GPU timings", self.fallback_samples);
        }

        *self = Self::default();
    }
}

struct WindowEntry {
    window: Arc<Window>,
    gpu: Gpu,
    timer: TimerService<WgpuTimerBackend>,
    ticker: FrameTicker,
    frame_index: u64,
}

struct DemoState {
    config: DemoConfig,
    gpu_init: GpuInit,
    timer_config: TimerConfig,
    timings: Rc<RefCell<TimingLog>>,
    window: Option<WindowEntry>,
}

impl DemoState {
    fn new(config: DemoConfig, gpu_init: GpuInit, timer_config: TimerConfig) -> Self {
        Self {
            config,
            gpu_init,
            timer_config,
            timings: Rc::default(),
            window: None,
        }
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(Arc::clone(&window), self.gpu_init.clone()))
            .context("GPU initialization failed for window")?;

        let backend = WgpuTimerBackend::new(gpu.device(), gpu.queue());
        let gate = backend.gate();
        let ticker = FrameTicker::new();
        let timer = TimerService::new(backend, gate, ticker.clone(), self.timer_config.clone());

        Ok(WindowEntry {
            window,
            gpu,
            timer,
            ticker,
            frame_index: 0,
        })
    }

    /// Renders one timed frame. Returns `false` when rendering cannot continue.
    fn redraw(&mut self) -> bool {
        let Some(entry) = self.window.as_mut() else {
            return true;
        };

        if entry.ticker.take() {
            entry.timer.tick();
        }

        let mut frame = match entry.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => return entry.gpu.handle_surface_error(err) != SurfaceErrorAction::Fatal,
        };

        let info = SessionInfo::labeled("frame").with_field("index", entry.frame_index.to_string());
        if let Err(e) = entry.timer.begin_timer(info) {
            log::warn!("frame {} not timed: {e}", entry.frame_index);
        }

        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gpu-timer demo clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(entry.frame_index)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        entry.window.pre_present_notify();
        entry.gpu.submit(frame);

        if entry.timer.session_state() == SessionState::Active || !entry.timer.is_supported() {
            let timings = Rc::clone(&self.timings);
            let report_every = self.config.report_every;
            if let Err(e) = entry
                .timer
                .end_timer_with(move |info| timings.borrow_mut().record(info, report_every))
            {
                log::warn!("frame {} timing dropped: {e}", entry.frame_index);
            }
        }

        entry.frame_index = entry.frame_index.wrapping_add(1);
        true
    }
}

/// Slowly cycling clear color so frames are visibly presented.
fn clear_color(frame_index: u64) -> wgpu::Color {
    let t = (frame_index % 600) as f64 / 600.0 * std::f64::consts::TAU;
    wgpu::Color {
        r: 0.1 + 0.05 * t.sin(),
        g: 0.1,
        b: 0.15 + 0.05 * t.cos(),
        a: 1.0,
    }
}

impl ApplicationHandler for DemoState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.window.request_redraw();
                self.window = Some(entry);
            }
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; the timer's poll loop rides on these frames.
        if let Some(entry) = &self.window {
            entry.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(entry) = self.window.as_mut() else {
            return;
        };
        if entry.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.gpu.resize(new_size);
                entry.window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.window.inner_size();
                entry.gpu.resize(new_size);
                entry.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if !self.redraw() {
                    log::error!("fatal surface error; exiting");
                    self.window = None;
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}
