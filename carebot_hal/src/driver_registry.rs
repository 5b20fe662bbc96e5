//! Output backend registry.
//!
//! Maps the `driver` name from configuration to a backend factory plus a
//! one-line summary for the startup log. Built by the supervisor and
//! passed to the context; there is no global registry.

use carebot_common::hal::output::{ActuatorOutput, OutputError, OutputFactory};
use std::collections::BTreeMap;
use tracing::debug;

struct Backend {
    factory: OutputFactory,
    summary: &'static str,
}

/// Output backends selectable by name.
pub struct DriverRegistry {
    backends: BTreeMap<&'static str, Backend>,
}

impl DriverRegistry {
    /// Registry with no backends.
    pub fn empty() -> Self {
        Self {
            backends: BTreeMap::new(),
        }
    }

    /// The backends shipped in this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.backends.insert(
            "simulation",
            Backend {
                factory: crate::drivers::simulation::create_driver,
                summary: "software actuators, no hardware attached",
            },
        );
        registry
    }

    /// Add a backend, e.g. a board-specific PWM driver.
    ///
    /// # Errors
    /// `OutputError::DuplicateDriver` if `name` is taken; the registry is unchanged.
    pub fn register(
        &mut self,
        name: &'static str,
        summary: &'static str,
        factory: OutputFactory,
    ) -> Result<(), OutputError> {
        if self.backends.contains_key(name) {
            return Err(OutputError::DuplicateDriver(name.to_string()));
        }
        self.backends.insert(name, Backend { factory, summary });
        Ok(())
    }

    /// Instantiate the backend configured as `name`. Not yet initialised.
    ///
    /// # Errors
    /// `OutputError::DriverNotFound` for an unknown name.
    pub fn create(&self, name: &str) -> Result<Box<dyn ActuatorOutput>, OutputError> {
        let backend = self
            .backends
            .get(name)
            .ok_or_else(|| OutputError::DriverNotFound(name.to_string()))?;
        debug!("Creating output backend '{}' ({})", name, backend.summary);
        Ok((backend.factory)())
    }

    /// Backend names with their summaries, sorted by name.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.backends
            .iter()
            .map(|(name, backend)| (*name, backend.summary))
            .collect()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
