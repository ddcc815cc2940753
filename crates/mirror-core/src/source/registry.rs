//! Source registry storage

use std::collections::HashMap;

use super::{RemoteSource, SourceDefinition};
use crate::{Error, Result};

/// Lookup of compiled sources by name.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, RemoteSource>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with all built-in sources.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for def in super::builtins::builtin_definitions() {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Compile and register a source, replacing any source of the same name.
    pub fn register(&mut self, definition: SourceDefinition) -> Result<()> {
        let source = RemoteSource::compile(definition)?;
        if self.sources.contains_key(source.name()) {
            tracing::debug!(source = source.name(), "overriding registered source");
        }
        self.sources.insert(source.name().to_string(), source);
        Ok(())
    }

    /// Get a source by name.
    pub fn get(&self, name: &str) -> Option<&RemoteSource> {
        self.sources.get(name)
    }

    /// Get a source by name, failing with [`Error::UnknownSource`].
    pub fn require(&self, name: &str) -> Result<&RemoteSource> {
        self.get(name).ok_or_else(|| Error::UnknownSource {
            name: name.to_string(),
        })
    }

    /// Check if a source is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// List all registered sources (sorted by name).
    pub fn list(&self) -> Vec<&RemoteSource> {
        let mut sources: Vec<_> = self.sources.values().collect();
        sources.sort_by(|a, b| a.name().cmp(b.name()));
        sources
    }
}
