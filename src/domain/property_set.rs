// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat key/value property sets with provenance.

use crate::domain::location::Location;
use indexmap::IndexMap;

/// A single property value together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyEntry {
    value: String,
    location: Location,
}

impl PropertyEntry {
    /// Creates a new entry.
    pub fn new(value: impl Into<String>, location: Location) -> Self {
        Self {
            value: value.into(),
            location,
        }
    }

    /// Returns the value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the location the value was loaded from.
    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// An insertion-ordered mapping of keys to values and their locations.
///
/// Order does not affect lookup; it only keeps dumps stable.
///
/// # Examples
///
/// ```
/// use hexprops::domain::{Location, PropertySet};
///
/// let mut set = PropertySet::new();
/// set.insert("cool.name", "Camel", Location::initial());
/// assert_eq!(set.get("cool.name"), Some("Camel"));
/// assert_eq!(set.location_of("cool.name"), Some(&Location::initial()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: IndexMap<String, PropertyEntry>,
}

impl PropertySet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set where every key shares the same location.
    pub fn from_pairs<I, K, V>(pairs: I, location: &Location) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (key, value) in pairs {
            set.insert(key, value, location.clone());
        }
        set
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, location: Location) {
        self.entries
            .insert(key.into(), PropertyEntry::new(value, location));
    }

    /// Returns the value for the key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(PropertyEntry::value)
    }

    /// Returns the full entry for the key.
    pub fn entry(&self, key: &str) -> Option<&PropertyEntry> {
        self.entries.get(key)
    }

    /// Returns the location the key was loaded from.
    pub fn location_of(&self, key: &str) -> Option<&Location> {
        self.entries.get(key).map(PropertyEntry::location)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes a key, returning its entry.
    pub fn remove(&mut self, key: &str) -> Option<PropertyEntry> {
        self.entries.shift_remove(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys and entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Copies every entry of `other` into this set, replacing existing keys.
    pub fn extend_from(&mut self, other: &PropertySet) {
        for (key, entry) in other.iter() {
            self.entries.insert(key.to_string(), entry.clone());
        }
    }

    /// Returns a new set containing only the keys accepted by `filter`.
    pub fn filtered(&self, filter: &dyn Fn(&str) -> bool) -> PropertySet {
        PropertySet {
            entries: self
                .entries
                .iter()
                .filter(|(key, _)| filter(key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
