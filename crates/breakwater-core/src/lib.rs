//! Breakwater Core Library
//!
//! This crate provides per-command circuit breaking for fallible async work:
//! a registry of named commands with their breaker tuning and trip policy,
//! a guarded executor for arbitrary work, and an HTTP executor that issues
//! one request per call under a deadline.

pub mod breaker;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod policy;

// Re-export commonly used types
pub use breaker::{BreakerSet, BreakerSettings, BreakerStats, CircuitState};
pub use config::{CommandConfig, load_commands};
pub use error::{ConfigError, ConfigResult, GuardError, Rejection};
pub use executor::GuardedExecutor;
pub use http::{
    ErrorKind, HttpError, HttpExecutor, HttpMethod, HttpOutcome, HttpTransport, RequestSpec,
    ReqwestTransport,
};
pub use policy::{CommandRegistry, TripMatcher, TripPolicy};
