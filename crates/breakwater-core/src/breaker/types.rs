//! Circuit breaker types and settings

use std::time::{Duration, Instant};

use crate::config::defaults;
use crate::error::{ConfigError, ConfigResult};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, calls proceed normally
    Closed,
    /// Circuit is open, calls are rejected
    Open,
    /// Sleep window elapsed, a single probe call is allowed through
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Tuning applied to one command's circuit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Calls allowed in flight at once
    pub max_concurrency: usize,
    /// Error percentage (0-100) in the rolling window that opens the circuit
    pub error_percent_threshold: u32,
    /// Minimum calls in the rolling window before the percentage applies
    pub request_volume_threshold: u32,
    /// Run timeout for each admitted call
    pub timeout: Duration,
    /// Time an open circuit waits before admitting a probe
    pub sleep_window: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::DEFAULT_MAX_CONCURRENCY,
            error_percent_threshold: defaults::DEFAULT_ERROR_PERCENT_THRESHOLD,
            request_volume_threshold: defaults::DEFAULT_REQUEST_VOLUME_THRESHOLD,
            timeout: defaults::DEFAULT_COMMAND_TIMEOUT,
            sleep_window: defaults::DEFAULT_SLEEP_WINDOW,
        }
    }
}

impl BreakerSettings {
    /// Reject tuning the breaker cannot run with
    pub fn validate(&self, command: &str) -> ConfigResult<()> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::invalid(command, "max_concurrency must be at least 1"));
        }
        if self.error_percent_threshold > 100 {
            return Err(ConfigError::invalid(
                command,
                format!(
                    "error_percent_threshold must be within 0..=100, got {}",
                    self.error_percent_threshold
                ),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::invalid(command, "timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Snapshot of one circuit
#[derive(Debug, Clone)]
pub struct BreakerStats {
    pub state: CircuitState,
    /// Calls currently holding an admission
    pub in_flight: usize,
    /// Successes reported inside the rolling window
    pub window_successes: u64,
    /// Failures reported inside the rolling window
    pub window_failures: u64,
    pub total_calls: u64,
    pub total_failures: u64,
    pub total_rejections: u64,
    pub last_failure: Option<Instant>,
    pub opened_at: Option<Instant>,
}

impl BreakerStats {
    /// Failure rate of the rolling window as a percentage
    pub fn error_percentage(&self) -> f64 {
        let total = self.window_successes + self.window_failures;
        if total == 0 {
            0.0
        } else {
            (self.window_failures as f64 / total as f64) * 100.0
        }
    }
}
