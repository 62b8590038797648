//! Run units of work under a command's breaker

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::GuardError;
use crate::policy::CommandRegistry;

/// Runs units of work under the breaker of a named command.
///
/// The caller always sees the unit of work's real outcome. The registry's
/// trip policy only decides what the breaker is told: a matching error is
/// reported as a failure, any other error as a success.
#[derive(Clone)]
pub struct GuardedExecutor {
    registry: Arc<CommandRegistry>,
}

impl GuardedExecutor {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Execute `work` under `command`.
    ///
    /// The first call under a name creates that command's circuit, registered
    /// or not, and the circuit lives as long as the registry. Run work under a
    /// fixed set of command names; do not derive names from request data.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Rejected`] if the circuit is open or at its concurrency
    ///   limit; `work` is never called
    /// - [`GuardError::Timeout`] if `work` outlives the command's run timeout;
    ///   counted as a breaker failure
    /// - [`GuardError::Failed`] with the error `work` returned
    ///
    /// # Examples
    ///
    /// ```
    /// use breakwater_core::config::CommandConfig;
    /// use breakwater_core::executor::GuardedExecutor;
    /// use breakwater_core::policy::CommandRegistry;
    /// use std::sync::Arc;
    ///
    /// # async fn example() {
    /// let registry = Arc::new(CommandRegistry::new());
    /// registry
    ///     .register("do.something", CommandConfig::new().with_triggering_error("something"))
    ///     .unwrap();
    ///
    /// let executor = GuardedExecutor::new(registry);
    /// let result: Result<u32, _> = executor
    ///     .run_guarded("do.something", || async { Ok::<_, std::io::Error>(42) })
    ///     .await;
    /// assert_eq!(result.unwrap(), 42);
    /// # }
    /// ```
    pub async fn run_guarded<T, E, F, Fut>(
        &self,
        command: &str,
        work: F,
    ) -> Result<T, GuardError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let admission = match self.registry.breakers().acquire(command) {
            Ok(admission) => admission,
            Err(rejection) => {
                debug!(command, %rejection, "call rejected by breaker");
                return Err(GuardError::Rejected(rejection));
            }
        };

        let limit = admission.timeout();
        match tokio::time::timeout(limit, work()).await {
            Ok(Ok(value)) => {
                admission.record_success();
                Ok(value)
            }
            Ok(Err(err)) => {
                if self.registry.should_count_toward_trip(command, &err) {
                    debug!(command, error = %err, "error counts toward trip");
                    admission.record_failure();
                } else {
                    debug!(command, error = %err, "error swallowed by trip policy");
                    admission.record_success();
                }
                Err(GuardError::Failed(err))
            }
            Err(_) => {
                warn!(command, ?limit, "command timed out");
                admission.record_failure();
                Err(GuardError::Timeout {
                    command: command.to_string(),
                    limit,
                })
            }
        }
    }
}
