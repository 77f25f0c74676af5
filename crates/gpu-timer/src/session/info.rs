use std::collections::BTreeMap;

/// Completion handle for one session.
///
/// Invoked exactly once, from inside `TimerService::tick`. Receives the
/// populated record in hardware mode and `None` in fallback mode.
pub type TimerCallback = Box<dyn FnOnce(Option<SessionInfo>)>;

/// Metadata record for a timed session.
///
/// Caller-owned fields (`label`, `fields`) are passed through untouched.
/// Durations are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInfo {
    pub label: Option<String>,
    pub fields: BTreeMap<String, String>,

    /// CPU wall-clock time between begin and end.
    pub cpu_time: Option<f64>,

    /// GPU elapsed time. `None` until the hardware result is resolved.
    pub gpu_time: Option<f64>,

    /// Set at begin, removed at end; never visible to the callback.
    cpu_start_time: Option<f64>,
}

impl SessionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Start timestamp of a session that is still active.
    pub fn cpu_start_time(&self) -> Option<f64> {
        self.cpu_start_time
    }

    pub(crate) fn mark_started(&mut self, now: f64) {
        self.cpu_start_time = Some(now);
    }

    /// Converts the start timestamp into `cpu_time`.
    pub(crate) fn mark_ended(&mut self, now: f64) {
        if let Some(start) = self.cpu_start_time.take() {
            self.cpu_time = Some(now - start);
        }
    }
}
