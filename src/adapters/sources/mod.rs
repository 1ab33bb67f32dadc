// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties source adapters.
//!
//! Every location resolver has a source: [`FileSource`] for `file:`,
//! [`ClasspathSource`] for `classpath:` and [`RefSource`] for `ref:`.
//! [`InMemorySource`] holds properties added programmatically.

mod classpath;
mod file;
mod in_memory;
mod reference;

pub use classpath::ClasspathSource;
pub use file::FileSource;
pub use in_memory::InMemorySource;
pub use reference::RefSource;

use crate::adapters::formats::{format_for_path, PropertiesEncoding};
use crate::domain::{Location, PropertiesError, PropertySet, Result};
use std::sync::{Arc, RwLock};

/// Strips trailing space characters from a loaded value.
///
/// Only plain spaces are removed; tabs and line breaks that were written as
/// escapes in the resource are part of the value.
pub(crate) fn trim_trailing_spaces(mut value: String) -> String {
    let trimmed = value.trim_end_matches(' ').len();
    value.truncate(trimmed);
    value
}

/// Whether a reload `pattern` selects `location`.
///
/// `None` selects everything. Otherwise the pattern is compared with the
/// path and with the `resolver:path` label, first literally and then as a
/// glob.
pub(crate) fn matches_pattern(location: &Location, pattern: Option<&str>) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    let label = location.label();
    if pattern == location.path() || pattern == label {
        return true;
    }
    match glob::Pattern::new(pattern) {
        Ok(glob) => glob.matches(location.path()) || glob.matches(&label),
        Err(e) => {
            tracing::debug!("Reload pattern '{}' is not a valid glob: {}", pattern, e);
            false
        }
    }
}

/// Turns raw resource content into a property set for `location`.
pub(crate) fn parse_content(
    location: &Location,
    content: &[u8],
    encoding: PropertiesEncoding,
) -> Result<PropertySet> {
    let format = format_for_path(location.path(), encoding);
    let pairs = format.parse(content).map_err(|e| PropertiesError::SourceLoad {
        location: location.label(),
        message: e.to_string(),
        source: Some(Box::new(e)),
    })?;

    let mut set = PropertySet::new();
    for (key, value) in pairs {
        set.insert(key, trim_trailing_spaces(value), location.clone());
    }
    Ok(set)
}

/// Result of a missing backing resource: empty when tolerated, an error otherwise.
pub(crate) fn missing_resource(location: &Location, ignore_missing: bool) -> Result<PropertySet> {
    if location.is_optional() || ignore_missing {
        tracing::warn!(
            "Properties location '{}' not found, continuing with no properties",
            location.label()
        );
        Ok(PropertySet::new())
    } else {
        Err(PropertiesError::MissingLocation {
            location: location.label(),
        })
    }
}

/// Load-once cache shared by the resource backed sources.
///
/// The cached set is swapped as a whole, so concurrent readers either see the
/// previous set or the new one.
#[derive(Debug, Default)]
pub(crate) struct LoadedProperties {
    cache: RwLock<Option<Arc<PropertySet>>>,
}

impl LoadedProperties {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the cached set, running `load` first if nothing is cached.
    pub(crate) fn get_or_load<F>(&self, load: F) -> Result<Arc<PropertySet>>
    where
        F: FnOnce() -> Result<PropertySet>,
    {
        if let Ok(cache) = self.cache.read() {
            if let Some(set) = cache.as_ref() {
                return Ok(Arc::clone(set));
            }
        }

        let mut cache = self.cache.write().map_err(|_| PropertiesError::SourceLoad {
            location: "cache".to_string(),
            message: "properties cache lock poisoned".to_string(),
            source: None,
        })?;
        // another thread may have loaded while we waited for the write lock
        if let Some(set) = cache.as_ref() {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(load()?);
        *cache = Some(Arc::clone(&set));
        Ok(set)
    }

    /// Loads a fresh set and replaces the cached one.
    pub(crate) fn replace_with<F>(&self, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<PropertySet>,
    {
        let set = Arc::new(load()?);
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(set);
        }
        Ok(())
    }

    pub(crate) fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
    }

    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.cache.read().map(|c| c.is_some()).unwrap_or(false)
    }
}
