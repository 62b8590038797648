//! Trip policies
//!
//! Decouples "did the call fail" from "should this failure move the breaker
//! toward open": errors that match no policy are returned to the caller but
//! reported to the breaker as successes.

mod matcher;
mod registry;

pub use matcher::TripMatcher;
pub use registry::{CommandRegistry, TripPolicy};
