//! Command routing logic for CLI

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use breakwater_core::{CommandConfig, CommandRegistry, load_commands};

use crate::args::{Cli, Commands, TuningArgs};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let registry = Arc::new(CommandRegistry::new());
    if let Some(path) = &cli.config {
        register_from_file(&registry, path)?;
    }

    match cli.command {
        Commands::Http(args) => {
            register_fallback(&registry, &args.command, &args.tuning)?;
            commands::http::run(registry, args).await
        }
        Commands::Exec(args) => {
            register_fallback(&registry, &args.command, &args.tuning)?;
            commands::exec::run(registry, args).await
        }
    }
}

fn register_from_file(registry: &CommandRegistry, path: &Path) -> anyhow::Result<()> {
    let configs = load_commands(path)
        .with_context(|| format!("Failed to load commands from {}", path.display()))?;

    registry.register_many(configs).map_err(|errors| {
        let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow!("invalid commands in {}: {}", path.display(), reasons.join("; "))
    })?;

    tracing::info!(
        commands = ?registry.commands(),
        "Registered commands from {}",
        path.display()
    );
    Ok(())
}

/// Register `command` from the tuning flags unless the file already did
fn register_fallback(
    registry: &CommandRegistry,
    command: &str,
    tuning: &TuningArgs,
) -> anyhow::Result<()> {
    if registry.policy(command).is_some() {
        return Ok(());
    }
    registry.register(command, config_from_flags(tuning))?;
    Ok(())
}

fn config_from_flags(tuning: &TuningArgs) -> CommandConfig {
    let mut config = CommandConfig::new()
        .with_triggering_errors(tuning.trip_on.iter().map(String::as_str))
        .with_poll_on_any_error(tuning.poll_on_any_error);

    if let Some(limit) = tuning.max_concurrency {
        config = config.with_max_concurrency(limit);
    }
    if let Some(percent) = tuning.error_percent {
        config = config.with_error_percent_threshold(percent);
    }
    if let Some(volume) = tuning.volume {
        config = config.with_request_volume_threshold(volume);
    }
    config
}
