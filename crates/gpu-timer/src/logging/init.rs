use std::sync::Once;

/// Environment variable consulted before `RUST_LOG`.
pub const FILTER_ENV: &str = "GPU_TIMER_LOG";

/// Filter used when neither the config nor the environment provides one.
///
/// Quiet globally, but keeps the capability probe result visible.
pub const DEFAULT_FILTER: &str = "warn,gpu_timer=info";

/// Logger configuration.
///
/// Filters follow the `env_logger` syntax (e.g. "info", "gpu_timer=debug,wgpu=warn").
/// `env_filter` overrides the environment; `default_filter` only applies when
/// the environment is silent.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_filter: String,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_filter: DEFAULT_FILTER.to_owned(),
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Picks the filter string: explicit config, then `GPU_TIMER_LOG`, then
/// `RUST_LOG`, then `default`.
pub fn resolve_filter<F>(explicit: Option<&str>, default: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    // Blank values count as unset at every step.
    let non_blank = |s: String| (!s.trim().is_empty()).then_some(s);

    explicit
        .map(str::to_owned)
        .and_then(non_blank)
        .or_else(|| lookup(FILTER_ENV).and_then(non_blank))
        .or_else(|| lookup("RUST_LOG").and_then(non_blank))
        .unwrap_or_else(|| default.to_owned())
}

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. A logger installed by someone else wins;
/// the failure is reported at debug level through that logger.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(
            config.env_filter.as_deref(),
            &config.default_filter,
            |key| std::env::var(key).ok(),
        );

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if let Err(e) = builder.try_init() {
            log::debug!("logger already installed: {e}");
            return;
        }

        log::debug!("logging initialized (filter: {filter})");
    });
}
