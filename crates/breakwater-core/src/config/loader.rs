//! File-based command configuration loading

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::command::CommandConfig;
use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Default, Deserialize)]
struct CommandsFile {
    #[serde(default)]
    commands: BTreeMap<String, CommandConfig>,
}

/// Load command configurations from a TOML file.
///
/// ```toml
/// [commands."do.get"]
/// max_concurrency = 200
/// error_percent_threshold = 2
/// timeout = "10s"
/// triggering_errors = [{ kind = "server_fault" }]
/// ```
pub fn load_commands(path: &Path) -> ConfigResult<BTreeMap<String, CommandConfig>> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file: CommandsFile = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        commands = file.commands.len(),
        "loaded command configuration"
    );
    Ok(file.commands)
}
