//! Name → constructor table for checks.

use crate::check::CheckBox;
use crate::config::{CheckOptions, ConfigError};

use std::collections::BTreeMap;

/// Builds a check instance from its options.
pub type CheckFactory = fn(&CheckOptions) -> Result<CheckBox, ConfigError>;

/// Registered check constructors, keyed by check name.
#[derive(Debug, Clone, Default)]
pub struct CheckRegistry {
    factories: BTreeMap<String, CheckFactory>,
}

impl CheckRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: CheckFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Looks up the constructor for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCheck`] if nothing is registered.
    pub fn factory(&self, name: &str) -> Result<CheckFactory, ConfigError> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownCheck {
                name: name.to_string(),
            })
    }

    /// Constructs the check registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCheck`] or whatever the constructor
    /// reports for bad options.
    pub fn create(&self, name: &str, options: &CheckOptions) -> Result<CheckBox, ConfigError> {
        (self.factory(name)?)(options)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
