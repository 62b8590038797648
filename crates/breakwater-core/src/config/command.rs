//! Per-command configuration

use std::time::Duration;

use serde::Deserialize;

use super::defaults;
use crate::breaker::BreakerSettings;
use crate::policy::TripMatcher;

/// Configuration registered for one command name.
///
/// Breaker tuning (`max_concurrency`, `error_percent_threshold`, `timeout`,
/// `sleep_window`, `request_volume_threshold`) is forwarded to the breaker.
/// `triggering_errors` and `poll_on_any_error` form the trip policy that
/// decides which unit-of-work errors count as breaker failures.
///
/// # Example
///
/// ```
/// use breakwater_core::config::CommandConfig;
/// use breakwater_core::policy::TripMatcher;
/// use std::time::Duration;
///
/// let config = CommandConfig::new()
///     .with_max_concurrency(200)
///     .with_error_percent_threshold(25)
///     .with_timeout(Duration::from_secs(10))
///     .with_triggering_error(TripMatcher::message("upstream unavailable"));
/// assert_eq!(config.triggering_errors.len(), 1);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Calls allowed in flight at once
    pub max_concurrency: usize,

    /// Error percentage (0-100) in the rolling window that opens the circuit
    pub error_percent_threshold: u32,

    /// Minimum calls in the rolling window before the percentage applies
    pub request_volume_threshold: u32,

    /// Run timeout enforced by the breaker
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// How long an open circuit waits before letting a probe through
    #[serde(with = "humantime_serde")]
    pub sleep_window: Duration,

    /// Errors that count toward tripping the breaker
    pub triggering_errors: Vec<TripMatcher>,

    /// Count every error, regardless of `triggering_errors`
    pub poll_on_any_error: bool,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            max_concurrency: defaults::DEFAULT_MAX_CONCURRENCY,
            error_percent_threshold: defaults::DEFAULT_ERROR_PERCENT_THRESHOLD,
            request_volume_threshold: defaults::DEFAULT_REQUEST_VOLUME_THRESHOLD,
            timeout: defaults::DEFAULT_COMMAND_TIMEOUT,
            sleep_window: defaults::DEFAULT_SLEEP_WINDOW,
            triggering_errors: Vec::new(),
            poll_on_any_error: false,
        }
    }
}

impl CommandConfig {
    /// Create a configuration with default tuning and an empty trip policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit;
        self
    }

    pub fn with_error_percent_threshold(mut self, percent: u32) -> Self {
        self.error_percent_threshold = percent;
        self
    }

    pub fn with_request_volume_threshold(mut self, volume: u32) -> Self {
        self.request_volume_threshold = volume;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sleep_window(mut self, window: Duration) -> Self {
        self.sleep_window = window;
        self
    }

    /// Append one matcher to the trip policy
    pub fn with_triggering_error(mut self, matcher: impl Into<TripMatcher>) -> Self {
        self.triggering_errors.push(matcher.into());
        self
    }

    /// Replace the whole set of triggering errors
    pub fn with_triggering_errors<I, M>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<TripMatcher>,
    {
        self.triggering_errors = matchers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_poll_on_any_error(mut self, poll: bool) -> Self {
        self.poll_on_any_error = poll;
        self
    }

    /// Breaker tuning carried by this configuration
    pub fn breaker_settings(&self) -> BreakerSettings {
        BreakerSettings {
            max_concurrency: self.max_concurrency,
            error_percent_threshold: self.error_percent_threshold,
            request_volume_threshold: self.request_volume_threshold,
            timeout: self.timeout,
            sleep_window: self.sleep_window,
        }
    }
}
