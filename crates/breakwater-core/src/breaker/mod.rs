//! Circuit breakers, one per command
//!
//! Each command gets a [`CommandCircuit`] that gates concurrency, keeps a
//! rolling window of reported outcomes and trips open once the error
//! percentage crosses its threshold. After the sleep window a single probe
//! decides whether the circuit closes again.

mod circuit;
mod set;
mod types;
mod window;


pub use circuit::{Admission, CommandCircuit};
pub use set::BreakerSet;
pub use types::{BreakerSettings, BreakerStats, CircuitState};
