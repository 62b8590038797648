//! Default tuning values
//!
//! Breaker defaults follow the usual Hystrix command defaults, except the run
//! timeout, which is kept above [`DEFAULT_HTTP_TIMEOUT`] so an HTTP call that
//! relies on the default deadline is never cut short by the breaker first.

use std::time::Duration;

/// Default per-request deadline for guarded HTTP calls (5 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Default breaker run timeout for a command (10 seconds)
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of calls allowed in flight per command
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Default error percentage at which the circuit opens
pub const DEFAULT_ERROR_PERCENT_THRESHOLD: u32 = 50;

/// Default minimum number of calls in the rolling window before the
/// error percentage is evaluated
pub const DEFAULT_REQUEST_VOLUME_THRESHOLD: u32 = 20;

/// Default time an open circuit waits before admitting a probe (5 seconds)
pub const DEFAULT_SLEEP_WINDOW: Duration = Duration::from_secs(5);

/// Length of the rolling statistics window (10 seconds, 1-second buckets)
pub const ROLLING_WINDOW: Duration = Duration::from_secs(10);
