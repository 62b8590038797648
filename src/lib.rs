//! Breakwater
//!
//! Per-command circuit breaking for async Rust, with trip policies that
//! decide which errors count against a command's breaker.
//!
//! A call runs under a named command. The command's breaker may reject it
//! outright (open circuit, concurrency limit), otherwise the unit of work
//! runs and its real result goes back to the caller. Only errors that match
//! the command's trip policy are reported to the breaker as failures; every
//! other error is passed through while the breaker records a success.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use breakwater::{CommandConfig, CommandRegistry, ErrorKind, HttpExecutor, RequestSpec};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(CommandRegistry::new());
//! registry.register(
//!     "do.get",
//!     CommandConfig::new()
//!         .with_max_concurrency(1)
//!         .with_triggering_error(ErrorKind::Timeout)
//!         .with_triggering_error(ErrorKind::ServerFault),
//! )?;
//!
//! let executor = HttpExecutor::new(registry);
//! let request = RequestSpec::get("http://localhost:8080/api/v1/items")
//!     .with_timeout(Duration::from_millis(100));
//! let outcome = executor
//!     .run_guarded_http(&CancellationToken::new(), "do.get", &request)
//!     .await?;
//! println!("{}", outcome.body);
//! # Ok(())
//! # }
//! ```

pub use breakwater_core::*;
