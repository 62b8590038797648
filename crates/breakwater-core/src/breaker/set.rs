//! Named collection of command circuits

use std::sync::Arc;

use dashmap::DashMap;

use super::circuit::{Admission, CommandCircuit};
use super::types::{BreakerSettings, BreakerStats};
use crate::error::{ConfigResult, Rejection};

/// Circuits for every command, created on first use
pub struct BreakerSet {
    circuits: DashMap<String, Arc<CommandCircuit>>,
    default_settings: BreakerSettings,
}

impl BreakerSet {
    /// Create a set whose unconfigured commands use default settings
    pub fn new() -> Self {
        Self::with_defaults(BreakerSettings::default())
    }

    /// Create a set with custom settings for unconfigured commands
    pub fn with_defaults(settings: BreakerSettings) -> Self {
        Self {
            circuits: DashMap::new(),
            default_settings: settings,
        }
    }

    /// Get or create the circuit for a command.
    ///
    /// Circuits are never evicted, so the set grows with every distinct name.
    pub fn get(&self, name: &str) -> Arc<CommandCircuit> {
        if let Some(circuit) = self.circuits.get(name) {
            return Arc::clone(circuit.value());
        }
        self.circuits
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(CommandCircuit::new(name, self.default_settings.clone()))
            })
            .clone()
    }

    /// Apply tuning to a command, creating its circuit if needed.
    ///
    /// Settings are validated first; an invalid set leaves the circuit as it was.
    pub fn configure(&self, name: &str, settings: BreakerSettings) -> ConfigResult<()> {
        settings.validate(name)?;
        self.get(name).configure(settings);
        tracing::debug!(circuit = %name, "applied breaker settings");
        Ok(())
    }

    /// Ask the command's circuit for permission to run one call
    pub fn acquire(&self, name: &str) -> Result<Admission, Rejection> {
        self.get(name).acquire()
    }

    /// Force a command's circuit open
    pub fn trip(&self, name: &str) {
        self.get(name).trip();
    }

    /// Stats for one command, if its circuit exists
    pub fn stats(&self, name: &str) -> Option<BreakerStats> {
        self.circuits.get(name).map(|circuit| circuit.stats())
    }

    /// Get all circuit names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.circuits.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Get stats for all circuits
    pub fn all_stats(&self) -> Vec<(String, BreakerStats)> {
        let mut results: Vec<_> = self
            .circuits
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().stats()))
            .collect();
        results.sort_by(|a, b| a.0.cmp(&b.0));
        results
    }

    /// Reset all circuits
    pub fn reset_all(&self) {
        for entry in self.circuits.iter() {
            entry.value().reset();
        }
    }
}

impl Default for BreakerSet {
    fn default() -> Self {
        Self::new()
    }
}
