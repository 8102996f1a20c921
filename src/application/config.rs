use std::time::Duration;

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::domain::errors::{AppResult, ConfigurationError};
use crate::domain::logging::LogLevel;
use crate::domain::view::ViewKind;

/// Longest delay `setTimeout` honours; larger ones fire at once.
pub const MAX_INTERVAL_MS: u64 = i32::MAX as u64;

/// Poller settings passed from the page as a plain JS object.
///
/// Every field is optional; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PollConfig {
    /// Prefix for every endpoint path, empty for same-origin
    pub base_url: String,
    pub mount_retry_ms: u64,
    pub success_interval_ms: u64,
    pub failure_retry_ms: u64,
    pub progress_interval_ms: u64,
    pub heartbeat_enabled: bool,
    pub heartbeat_interval_ms: u64,
    pub stop_when_anchor_removed: bool,
    pub log_level: LogLevel,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            mount_retry_ms: 50,
            success_interval_ms: 60_000,
            failure_retry_ms: 1_000,
            progress_interval_ms: 1_000,
            heartbeat_enabled: false,
            heartbeat_interval_ms: 2_000,
            stop_when_anchor_removed: true,
            log_level: LogLevel::Info,
        }
    }
}

impl PollConfig {
    /// Reads the config object handed to the exported API.
    pub fn from_js(value: &JsValue) -> AppResult<Self> {
        use gloo::utils::format::JsValueSerdeExt;

        if value.is_undefined() || value.is_null() {
            return Ok(Self::default());
        }
        let config: PollConfig = value
            .into_serde()
            .map_err(|e| ConfigurationError::Unreadable(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(value: serde_json::Value) -> AppResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let config: PollConfig = serde_json::from_value(value)
            .map_err(|e| ConfigurationError::Unreadable(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let intervals = [
            ("mountRetryMs", self.mount_retry_ms),
            ("successIntervalMs", self.success_interval_ms),
            ("failureRetryMs", self.failure_retry_ms),
            ("progressIntervalMs", self.progress_interval_ms),
            ("heartbeatIntervalMs", self.heartbeat_interval_ms),
        ];
        for (name, ms) in intervals {
            if ms == 0 {
                return Err(ConfigurationError::InvalidParameter(format!("{name} must be positive")));
            }
            if ms > MAX_INTERVAL_MS {
                return Err(ConfigurationError::InvalidParameter(format!(
                    "{name} must not exceed {MAX_INTERVAL_MS} ms"
                )));
            }
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigurationError::InvalidParameter(
                "baseUrl must not end with '/'".to_string(),
            ));
        }
        Ok(())
    }

    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            mount_retry: Duration::from_millis(self.mount_retry_ms),
            success_interval: Duration::from_millis(self.success_interval_ms),
            failure_retry: Duration::from_millis(self.failure_retry_ms),
            progress_interval: Duration::from_millis(self.progress_interval_ms),
            stop_when_anchor_removed: self.stop_when_anchor_removed,
        }
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

/// Result of one refresh cycle, as far as scheduling is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The view is not mounted on this page; nothing was fetched
    AnchorAbsent,
    /// Network, status or payload error; nothing was touched
    Failed,
    /// The server had nothing to render
    Empty,
    Unchanged,
    Rendered,
    /// A terminal state fired the view's transition form
    Terminal,
}

impl RefreshOutcome {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            RefreshOutcome::Empty
                | RefreshOutcome::Unchanged
                | RefreshOutcome::Rendered
                | RefreshOutcome::Terminal
        )
    }
}

/// What a poll task does after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    After(Duration),
    Stop,
}

/// Turns refresh outcomes into delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub mount_retry: Duration,
    pub success_interval: Duration,
    pub failure_retry: Duration,
    pub progress_interval: Duration,
    pub stop_when_anchor_removed: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollConfig::default().policy()
    }
}

impl PollPolicy {
    /// `anchor_seen` is whether this task has found its anchor before.
    pub fn next(&self, view: ViewKind, outcome: RefreshOutcome, anchor_seen: bool) -> Next {
        match outcome {
            RefreshOutcome::AnchorAbsent if anchor_seen && self.stop_when_anchor_removed => Next::Stop,
            RefreshOutcome::AnchorAbsent => Next::After(self.mount_retry),
            RefreshOutcome::Terminal if view.is_progress() => Next::Stop,
            RefreshOutcome::Failed if view.is_progress() => Next::After(self.progress_interval),
            RefreshOutcome::Failed => Next::After(self.failure_retry),
            _ if view.is_progress() => Next::After(self.progress_interval),
            _ => Next::After(self.success_interval),
        }
    }
}
