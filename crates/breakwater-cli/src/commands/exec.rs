//! `breakwater exec`: a synthetic unit of work under a command

use std::io;
use std::sync::Arc;

use breakwater_core::{CommandRegistry, GuardError, GuardedExecutor};
use tracing::{debug, info, warn};

use super::print_stats;
use crate::args::ExecArgs;

pub async fn run(registry: Arc<CommandRegistry>, args: ExecArgs) -> anyhow::Result<()> {
    let executor = GuardedExecutor::new(Arc::clone(&registry));

    for attempt in 1..=args.times {
        let fail_with = args.fail_with.clone();
        let result = executor
            .run_guarded(&args.command, || async move {
                match fail_with {
                    Some(message) => Err(io::Error::other(message)),
                    None => Ok(attempt),
                }
            })
            .await;

        match result {
            Ok(_) => info!(attempt, "Call succeeded"),
            Err(GuardError::Rejected(rejection)) => warn!(attempt, "Rejected: {}", rejection),
            Err(GuardError::Failed(err)) => {
                let counted = registry.should_count_toward_trip(&args.command, &err);
                warn!(attempt, counted, "Call failed: {}", err);
            }
            Err(err) => warn!(attempt, "Call failed: {}", err),
        }
    }

    debug!(command = %args.command, "Finished {} calls", args.times);
    print_stats(&registry);
    Ok(())
}
