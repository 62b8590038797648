//! Per-command circuit

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use super::types::{BreakerSettings, BreakerStats, CircuitState};
use super::window::RollingWindow;
use crate::config::defaults::ROLLING_WINDOW;
use crate::error::Rejection;

/// Circuit guarding one command
pub struct CommandCircuit {
    /// Command name (for logging and rejections)
    name: String,
    /// Tuning, replaced in place on re-registration
    settings: RwLock<BreakerSettings>,
    /// State machine and rolling counts
    inner: Mutex<CircuitInner>,
    /// Calls currently holding an admission
    in_flight: AtomicUsize,
    total_calls: AtomicU64,
    total_failures: AtomicU64,
    total_rejections: AtomicU64,
}

struct CircuitInner {
    state: CircuitState,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
    /// Bumped on every open and close; admissions from an older
    /// generation no longer drive state transitions
    generation: u64,
    last_failure: Option<Instant>,
    window: RollingWindow,
}

impl CommandCircuit {
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        Self {
            name: name.into(),
            settings: RwLock::new(settings),
            inner: Mutex::new(CircuitInner {
                state: CircuitState::Closed,
                opened_at: None,
                probe_in_flight: false,
                generation: 0,
                last_failure: None,
                window: RollingWindow::new(ROLLING_WINDOW),
            }),
            in_flight: AtomicUsize::new(0),
            total_calls: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_rejections: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> BreakerSettings {
        self.settings.read().clone()
    }

    /// Replace tuning. Takes effect on the next admission decision.
    pub fn configure(&self, settings: BreakerSettings) {
        *self.settings.write() = settings;
    }

    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Ask for permission to run one call.
    ///
    /// An open circuit whose sleep window has elapsed turns half-open and
    /// admits exactly one probe; everything else is rejected until the
    /// probe reports.
    pub fn acquire(self: &Arc<Self>) -> Result<Admission, Rejection> {
        let settings = self.settings();
        let mut inner = self.inner.lock();

        let probe = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                let sleeping = inner
                    .opened_at
                    .is_some_and(|opened| opened.elapsed() < settings.sleep_window);
                if sleeping {
                    return Err(self.reject_open());
                }
                inner.state = CircuitState::HalfOpen;
                tracing::info!(circuit = %self.name, "Circuit breaker transitioning to half-open");
                true
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    return Err(self.reject_open());
                }
                true
            }
        };

        let previous = self.in_flight.fetch_add(1, Ordering::AcqRel);
        if previous >= settings.max_concurrency {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            self.total_rejections.fetch_add(1, Ordering::Relaxed);
            return Err(Rejection::MaxConcurrency {
                command: self.name.clone(),
                limit: settings.max_concurrency,
            });
        }

        if probe {
            inner.probe_in_flight = true;
        }

        Ok(Admission {
            circuit: Arc::clone(self),
            timeout: settings.timeout,
            probe,
            generation: inner.generation,
            reported: false,
        })
    }

    /// Force the circuit open
    pub fn trip(&self) {
        let mut inner = self.inner.lock();
        self.open(&mut inner, Instant::now());
    }

    /// Force the circuit closed and forget the rolling counts
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        self.close(&mut inner);
    }

    pub fn stats(&self) -> BreakerStats {
        let mut inner = self.inner.lock();
        let (window_successes, window_failures) = inner.window.totals(Instant::now());
        BreakerStats {
            state: inner.state,
            in_flight: self.in_flight.load(Ordering::Acquire),
            window_successes,
            window_failures,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejections: self.total_rejections.load(Ordering::Relaxed),
            last_failure: inner.last_failure,
            opened_at: inner.opened_at,
        }
    }

    fn reject_open(&self) -> Rejection {
        self.total_rejections.fetch_add(1, Ordering::Relaxed);
        Rejection::CircuitOpen {
            command: self.name.clone(),
        }
    }

    fn report(&self, success: bool, probe: bool, generation: u64) {
        let now = Instant::now();
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.total_failures.fetch_add(1, Ordering::Relaxed);
        }

        let settings = self.settings();
        let mut inner = self.inner.lock();
        inner.window.record(now, success);
        if !success {
            inner.last_failure = Some(now);
        }

        if probe && inner.generation == generation {
            inner.probe_in_flight = false;
            if success {
                self.close(&mut inner);
            } else {
                self.open(&mut inner, now);
            }
            return;
        }

        if inner.state == CircuitState::Closed && !success {
            let (successes, failures) = inner.window.totals(now);
            let volume = successes + failures;
            let over_volume = volume >= u64::from(settings.request_volume_threshold);
            let over_threshold =
                failures * 100 >= u64::from(settings.error_percent_threshold) * volume;
            if over_volume && over_threshold {
                self.open(&mut inner, now);
            }
        }
    }

    fn open(&self, inner: &mut CircuitInner, now: Instant) {
        inner.generation += 1;
        inner.state = CircuitState::Open;
        inner.opened_at = Some(now);
        inner.probe_in_flight = false;

        tracing::warn!(
            circuit = %self.name,
            "Circuit breaker opened after {} failures",
            self.total_failures.load(Ordering::Relaxed)
        );
    }

    fn close(&self, inner: &mut CircuitInner) {
        inner.generation += 1;
        inner.state = CircuitState::Closed;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        inner.window.clear();

        tracing::info!(circuit = %self.name, "Circuit breaker closed");
    }
}

/// Permission to run one call under a circuit.
///
/// Holds a concurrency slot until dropped. Reporting consumes it; dropping it
/// unreported releases the slot without touching the statistics.
pub struct Admission {
    circuit: Arc<CommandCircuit>,
    timeout: Duration,
    probe: bool,
    generation: u64,
    reported: bool,
}

impl Admission {
    /// Run timeout the breaker applies to this call
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether this call is the half-open probe
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn record_success(mut self) {
        self.reported = true;
        self.circuit.report(true, self.probe, self.generation);
    }

    pub fn record_failure(mut self) {
        self.reported = true;
        self.circuit.report(false, self.probe, self.generation);
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.circuit.in_flight.fetch_sub(1, Ordering::AcqRel);
        if self.probe && !self.reported {
            let mut inner = self.circuit.inner.lock();
            if inner.generation == self.generation {
                inner.probe_in_flight = false;
            }
        }
    }
}
