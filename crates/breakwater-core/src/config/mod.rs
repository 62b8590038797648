//! Command configuration
//!
//! Tuning defaults, the per-command [`CommandConfig`] and TOML file loading.

mod command;
pub mod defaults;
mod loader;

pub use command::CommandConfig;
pub use defaults::{DEFAULT_COMMAND_TIMEOUT, DEFAULT_HTTP_TIMEOUT};
pub use loader::load_commands;
