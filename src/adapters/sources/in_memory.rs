// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory properties source.

use crate::domain::{Location, PropertySet, Result};
use crate::ports::{PropertiesSource, DEFAULT_SOURCE_PRIORITY};
use std::sync::RwLock;

/// A properties source backed by an in-memory map.
///
/// Useful for properties computed at startup and in tests.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::InMemorySource;
/// use hexprops::ports::PropertiesSource;
///
/// let source = InMemorySource::new("defaults")
///     .with_priority(10)
///     .with_property("cool.name", "Camel");
///
/// assert_eq!(source.get_property("cool.name").unwrap().as_deref(), Some("Camel"));
/// assert_eq!(source.priority(), 10);
/// ```
#[derive(Debug)]
pub struct InMemorySource {
    name: String,
    priority: u8,
    location: Location,
    properties: RwLock<PropertySet>,
}

impl InMemorySource {
    /// Creates an empty source with the default priority.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: DEFAULT_SOURCE_PRIORITY,
            location: Location::initial(),
            properties: RwLock::new(PropertySet::new()),
        }
    }

    /// Creates a source holding the given pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = Self::new(name);
        for (key, value) in pairs {
            source.insert(key, value);
        }
        source
    }

    /// Sets the priority of this source.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the location recorded for the properties of this source.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Adds a property.
    pub fn with_property(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a property.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Ok(mut properties) = self.properties.write() {
            properties.insert(key, value, self.location.clone());
        }
    }

    /// Removes a property, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.properties
            .write()
            .ok()
            .and_then(|mut properties| properties.remove(key))
            .map(|entry| entry.value().to_string())
    }
}

impl PropertiesSource for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn location(&self) -> Option<&Location> {
        Some(&self.location)
    }

    fn get_property(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .properties
            .read()
            .ok()
            .and_then(|properties| properties.get(key).map(str::to_string)))
    }

    fn load_properties(&self) -> Result<PropertySet> {
        Ok(self
            .properties
            .read()
            .map(|properties| properties.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_source() {
        let source = InMemorySource::from_pairs("test", [("a", "1"), ("b", "2")]);
        assert_eq!(source.name(), "test");
        assert_eq!(source.priority(), DEFAULT_SOURCE_PRIORITY);
        assert_eq!(source.get_property("a").unwrap().as_deref(), Some("1"));
        assert!(source.get_property("c").unwrap().is_none());
        assert_eq!(source.load_properties().unwrap().len(), 2);
    }

    #[test]
    fn test_in_memory_insert_and_remove() {
        let source = InMemorySource::new("test");
        source.insert("k", "v");
        assert_eq!(source.get_property("k").unwrap().as_deref(), Some("v"));
        assert_eq!(source.remove("k").as_deref(), Some("v"));
        assert!(source.get_property("k").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_filtered() {
        let source = InMemorySource::from_pairs("test", [("db.host", "h"), ("app", "x")]);
        let set = source
            .load_properties_filtered(&|key| key.starts_with("db."))
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_in_memory_reload_is_noop() {
        let source = InMemorySource::new("test");
        assert!(!source.reload(None).unwrap());
    }
}
