//! Guarded execution of arbitrary async work

mod guarded;


pub use guarded::GuardedExecutor;
