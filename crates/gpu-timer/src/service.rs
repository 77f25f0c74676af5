//! Public timer surface, one instance per rendering context.

use crate::capability::{Capability, CapabilityGate};
use crate::error::TimerError;
use crate::fallback::{FallbackQueue, DEFAULT_FALLBACK_DELAY_MS};
use crate::pending::PendingQueryQueue;
use crate::poll::{PassReport, PollScheduler};
use crate::query::{PoolStats, QueryBackend, QueryPool};
use crate::session::{SessionInfo, SessionState, TimerCallback, TimerSession};
use crate::tick::TickSource;
use crate::time::{ClockSource, SystemClock};

/// Timer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerConfig {
    /// Delay before a callback fires when hardware queries are unavailable.
    pub fallback_delay_ms: f64,

    /// Never use hardware queries, as if the capability were missing.
    pub disabled: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            fallback_delay_ms: DEFAULT_FALLBACK_DELAY_MS,
            disabled: false,
        }
    }
}

impl TimerConfig {
    pub const DISABLE_ENV: &'static str = "GPU_TIMER_DISABLE";
    pub const FALLBACK_DELAY_ENV: &'static str = "GPU_TIMER_FALLBACK_MS";

    /// Defaults overlaid with `GPU_TIMER_DISABLE` and `GPU_TIMER_FALLBACK_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    ///
    /// Malformed values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(Self::DISABLE_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.disabled = true,
                "0" | "false" | "no" | "off" | "" => config.disabled = false,
                other => log::warn!("ignoring {}={other:?}", Self::DISABLE_ENV),
            }
        }

        if let Some(raw) = lookup(Self::FALLBACK_DELAY_ENV) {
            match raw.trim().parse::<f64>() {
                Ok(ms) if ms.is_finite() && ms >= 0.0 => config.fallback_delay_ms = ms,
                _ => log::warn!("ignoring {}={raw:?}", Self::FALLBACK_DELAY_ENV),
            }
        }

        config
    }
}

/// Non-blocking GPU timer for one rendering context.
///
/// Usage per frame:
/// - `begin_timer` before recording the GPU work to measure
/// - `end_timer` after submitting it
/// - `tick` whenever the tick source fires
///
/// Any number of ended sessions may be in flight; only one may be open.
/// Results arrive through the callbacks, from inside `tick`.
pub struct TimerService<B: QueryBackend> {
    backend: B,
    gate: Box<dyn CapabilityGate>,
    clock: Box<dyn ClockSource>,
    ticker: Box<dyn TickSource>,
    config: TimerConfig,

    /// Resolved on first use, then fixed for the lifetime of the context.
    capability: Option<Capability>,

    pool: QueryPool<B::Query>,
    session: TimerSession<B::Query>,
    pending: PendingQueryQueue<B::Query>,
    fallback: FallbackQueue,
    scheduler: PollScheduler,
}

impl<B: QueryBackend> TimerService<B> {
    /// Creates a service using the system clock.
    pub fn new<G, T>(backend: B, gate: G, ticker: T, config: TimerConfig) -> Self
    where
        G: CapabilityGate + 'static,
        T: TickSource + 'static,
    {
        Self {
            backend,
            gate: Box::new(gate),
            clock: Box::new(SystemClock::new()),
            ticker: Box::new(ticker),
            config,
            capability: None,
            pool: QueryPool::new(),
            session: TimerSession::new(),
            pending: PendingQueryQueue::new(),
            fallback: FallbackQueue::new(),
            scheduler: PollScheduler::new(),
        }
    }

    /// Replaces the clock used for CPU timings and fallback deadlines.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: ClockSource + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    fn capability(&mut self) -> Capability {
        if let Some(cap) = self.capability {
            return cap;
        }

        let cap = Capability::resolve(&*self.gate, self.config.disabled);
        match cap {
            Capability::Hardware => log::info!("GPU timer queries available"),
            Capability::Unsupported => log::warn!(
                "GPU timer queries unsupported; callbacks fire after {} ms without timings",
                self.config.fallback_delay_ms
            ),
            Capability::Disabled => log::info!("GPU timer queries disabled by configuration"),
        }

        self.capability = Some(cap);
        cap
    }

    /// Whether hardware timings will be delivered. Probes on first call.
    pub fn is_supported(&mut self) -> bool {
        self.capability().is_hardware()
    }

    /// Opens a session.
    ///
    /// Without hardware support this does nothing.
    pub fn begin_timer(&mut self, info: SessionInfo) -> Result<(), TimerError> {
        if !self.capability().is_hardware() {
            return Ok(());
        }

        let now = self.clock.now();
        self.session
            .begin(info, now, &mut self.pool, &mut self.backend)
            .inspect_err(|e| log::error!("{e}"))
    }

    /// Closes the open session. `callback` later receives the populated record.
    ///
    /// Without hardware support no session is tracked: `callback` is invoked
    /// with `None` once the fallback delay has elapsed.
    pub fn end_timer(&mut self, callback: Option<TimerCallback>) -> Result<(), TimerError> {
        if !self.capability().is_hardware() {
            if let Some(callback) = callback {
                let now = self.clock.now();
                self.fallback.schedule(now, self.config.fallback_delay_ms, callback);
                self.scheduler.ensure_running(self.ticker.as_mut());
            }
            return Ok(());
        }

        let now = self.clock.now();
        let entry = self
            .session
            .end(now, &mut self.backend, callback)
            .inspect_err(|e| log::error!("{e}"))?;

        self.pending.push(entry);
        self.scheduler.ensure_running(self.ticker.as_mut());
        Ok(())
    }

    /// [`end_timer`](Self::end_timer) with a closure.
    pub fn end_timer_with<F>(&mut self, on_complete: F) -> Result<(), TimerError>
    where
        F: FnOnce(Option<SessionInfo>) + 'static,
    {
        self.end_timer(Some(Box::new(on_complete)))
    }

    /// Times `work` as one session and returns its output.
    pub fn measure<R, W, F>(&mut self, info: SessionInfo, work: W, on_complete: F) -> Result<R, TimerError>
    where
        W: FnOnce() -> R,
        F: FnOnce(Option<SessionInfo>) + 'static,
    {
        self.begin_timer(info)?;
        let out = work();
        self.end_timer_with(on_complete)?;
        Ok(out)
    }

    /// Runs one poll pass. Call when the tick source fires.
    pub fn tick(&mut self) -> PassReport {
        let now = self.clock.now();
        self.scheduler.run_pass(
            &mut self.backend,
            &mut self.pending,
            &mut self.pool,
            &mut self.fallback,
            now,
            self.ticker.as_mut(),
        )
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Ended sessions still waiting for their hardware result.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Fallback callbacks still waiting for their deadline.
    pub fn fallback_len(&self) -> usize {
        self.fallback.len()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}
