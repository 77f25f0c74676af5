//! Opens a window, clears it every frame and logs averaged CPU / GPU frame
//! timings delivered by `gpu-timer`.
//!
//! Environment:
//! - `GPU_TIMER_LOG` / `RUST_LOG`: log filter
//! - `GPU_TIMER_DISABLE=1`: skip hardware queries
//! - `GPU_TIMER_FALLBACK_MS`: fallback callback delay

mod app;
mod gpu;

use gpu_timer::logging::{init_logging, LoggingConfig};
use gpu_timer::TimerConfig;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig {
        default_filter: "warn,gpu_timer=info,gpu_timer_demo=info".to_owned(),
        ..LoggingConfig::default()
    });

    app::run(
        app::DemoConfig::default(),
        gpu::GpuInit::default(),
        TimerConfig::from_env(),
    )
}
