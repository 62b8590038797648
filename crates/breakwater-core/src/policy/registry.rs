//! Command registry: trip policies plus breaker tuning per command name

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use parking_lot::RwLock;

use super::matcher::TripMatcher;
use crate::breaker::BreakerSet;
use crate::config::CommandConfig;
use crate::error::{ConfigError, ConfigResult};

/// Which errors of a command count as breaker failures
#[derive(Debug, Clone, Default)]
pub struct TripPolicy {
    pub triggering_errors: Vec<TripMatcher>,
    pub poll_on_any_error: bool,
}

impl TripPolicy {
    pub fn counts(&self, err: &(dyn Error + 'static)) -> bool {
        self.poll_on_any_error || self.triggering_errors.iter().any(|m| m.matches(err))
    }
}

impl From<&CommandConfig> for TripPolicy {
    fn from(config: &CommandConfig) -> Self {
        Self {
            triggering_errors: config.triggering_errors.clone(),
            poll_on_any_error: config.poll_on_any_error,
        }
    }
}

/// Registry of commands shared by every executor that runs them.
///
/// One trip policy per command name. Registering a name again replaces its
/// policy and re-applies its tuning to the breaker.
///
/// # Example
///
/// ```
/// use breakwater_core::config::CommandConfig;
/// use breakwater_core::policy::CommandRegistry;
///
/// let registry = CommandRegistry::new();
/// registry
///     .register("do.something", CommandConfig::new().with_triggering_error("something"))
///     .unwrap();
///
/// let err = std::io::Error::other("something");
/// assert!(registry.should_count_toward_trip("do.something", &err));
/// assert!(!registry.should_count_toward_trip("unknown", &err));
/// ```
pub struct CommandRegistry {
    policies: RwLock<HashMap<String, Arc<TripPolicy>>>,
    breakers: Arc<BreakerSet>,
}

impl CommandRegistry {
    /// Create a registry with its own breaker set
    pub fn new() -> Self {
        Self::with_breakers(Arc::new(BreakerSet::new()))
    }

    /// Create a registry over an existing breaker set
    pub fn with_breakers(breakers: Arc<BreakerSet>) -> Self {
        Self {
            policies: RwLock::new(HashMap::new()),
            breakers,
        }
    }

    /// Register or re-register a command.
    ///
    /// Tuning is validated and applied to the breaker before the trip policy
    /// is replaced; on error neither changes. The policy lock is held across
    /// both steps, so concurrent registrations of one name leave tuning and
    /// policy from the same configuration.
    pub fn register(&self, name: &str, config: CommandConfig) -> ConfigResult<()> {
        let policy = Arc::new(TripPolicy::from(&config));

        let mut policies = self.policies.write();
        self.breakers.configure(name, config.breaker_settings())?;
        policies.insert(name.to_string(), policy);
        drop(policies);

        tracing::debug!(
            command = %name,
            triggering_errors = config.triggering_errors.len(),
            poll_on_any_error = config.poll_on_any_error,
            "registered command"
        );
        Ok(())
    }

    /// Register each entry independently.
    ///
    /// Valid entries are applied even when others fail; every failure is returned.
    pub fn register_many<I, S>(&self, commands: I) -> Result<(), Vec<ConfigError>>
    where
        I: IntoIterator<Item = (S, CommandConfig)>,
        S: AsRef<str>,
    {
        let errors: Vec<ConfigError> = commands
            .into_iter()
            .filter_map(|(name, config)| self.register(name.as_ref(), config).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Whether `err` observed under `name` should move the breaker toward open.
    ///
    /// Unregistered commands never trip.
    pub fn should_count_toward_trip(&self, name: &str, err: &(dyn Error + 'static)) -> bool {
        self.policy(name).is_some_and(|policy| policy.counts(err))
    }

    /// Current trip policy of a command
    pub fn policy(&self, name: &str) -> Option<Arc<TripPolicy>> {
        self.policies.read().get(name).cloned()
    }

    /// Registered command names, sorted
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self.policies.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Breaker set the registry configures
    pub fn breakers(&self) -> &Arc<BreakerSet> {
        &self.breakers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
