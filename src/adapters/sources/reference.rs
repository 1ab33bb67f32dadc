// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties source for `ref:` locations.

use super::{matches_pattern, missing_resource, trim_trailing_spaces, LoadedProperties};
use crate::domain::{Location, PropertySet, Result};
use crate::ports::{PropertiesRegistry, PropertiesSource};
use std::fmt;
use std::sync::Arc;

/// Properties source reading a named map from a [`PropertiesRegistry`].
///
/// The registry is consulted once per load; stopping the component clears
/// the cached map so a restart looks the reference up again.
pub struct RefSource {
    location: Location,
    name: String,
    registry: Arc<dyn PropertiesRegistry>,
    ignore_missing: bool,
    loaded: LoadedProperties,
}

impl fmt::Debug for RefSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefSource")
            .field("location", &self.location)
            .field("ignore_missing", &self.ignore_missing)
            .finish()
    }
}

impl RefSource {
    /// Creates a source for `location` looked up in `registry`.
    pub fn new(location: Location, registry: Arc<dyn PropertiesRegistry>) -> Self {
        Self {
            name: location.label(),
            location,
            registry,
            ignore_missing: false,
            loaded: LoadedProperties::new(),
        }
    }

    /// Treats a missing reference as empty even when the location is not optional.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    fn read(&self) -> Result<PropertySet> {
        match self.registry.lookup(self.location.path()) {
            Some(map) => {
                let mut set = PropertySet::new();
                for (key, value) in map {
                    set.insert(key, trim_trailing_spaces(value), self.location.clone());
                }
                tracing::debug!(
                    "Loaded {} properties from '{}'",
                    set.len(),
                    self.location.label()
                );
                Ok(set)
            }
            None => missing_resource(&self.location, self.ignore_missing),
        }
    }
}

impl PropertiesSource for RefSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Option<&Location> {
        Some(&self.location)
    }

    fn get_property(&self, key: &str) -> Result<Option<String>> {
        let set = self.loaded.get_or_load(|| self.read())?;
        Ok(set.get(key).map(str::to_string))
    }

    fn load_properties(&self) -> Result<PropertySet> {
        Ok(self.loaded.get_or_load(|| self.read())?.as_ref().clone())
    }

    fn load(&self) -> Result<()> {
        self.loaded.get_or_load(|| self.read()).map(|_| ())
    }

    fn reload(&self, pattern: Option<&str>) -> Result<bool> {
        if !matches_pattern(&self.location, pattern) {
            return Ok(false);
        }
        self.loaded.replace_with(|| self.read())?;
        Ok(true)
    }

    fn clear(&self) {
        self.loaded.clear();
    }
}
