// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties source trait definition.
//!
//! This module defines the `PropertiesSource` trait, the port through which
//! the lookup chain reads flat key/value stores. In-memory maps, files,
//! classpath resources and registry references all implement it.

use crate::domain::{Location, PropertySet, Result};

/// Priority given to sources that do not override [`PropertiesSource::priority`].
pub const DEFAULT_SOURCE_PRIORITY: u8 = 1;

/// A flat key/value store with provenance.
///
/// Sources are consulted by priority, highest first. Sources with equal
/// priority are consulted most recently added first.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Every method takes `&self`: a
/// source that caches its backing resource replaces the cached
/// [`PropertySet`] wholesale on reload, so readers never observe a partially
/// loaded set.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::PropertiesSource;
/// use hexprops::domain::{Location, PropertySet, Result};
///
/// struct Fixed;
///
/// impl PropertiesSource for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn get_property(&self, key: &str) -> Result<Option<String>> {
///         Ok((key == "answer").then(|| "42".to_string()))
///     }
///
///     fn load_properties(&self) -> Result<PropertySet> {
///         Ok(PropertySet::from_pairs([("answer", "42")], &Location::initial()))
///     }
/// }
///
/// let source = Fixed;
/// assert_eq!(source.get_property("answer").unwrap().as_deref(), Some("42"));
/// assert_eq!(source.priority(), 1);
/// ```
pub trait PropertiesSource: Send + Sync {
    /// Returns the name of this source.
    ///
    /// Used in diagnostics and as the source label handed to lookup listeners,
    /// so it should be unique among the registered sources.
    fn name(&self) -> &str;

    /// Returns the priority of this source. Higher values are consulted first.
    fn priority(&self) -> u8 {
        DEFAULT_SOURCE_PRIORITY
    }

    /// Returns the location backing this source, if any.
    fn location(&self) -> Option<&Location> {
        None
    }

    /// Looks up a single key.
    ///
    /// Returns `Ok(None)` when the key is absent. May return an error when a
    /// lazily loaded backing resource fails to load.
    fn get_property(&self, key: &str) -> Result<Option<String>>;

    /// Returns every property of this source.
    fn load_properties(&self) -> Result<PropertySet>;

    /// Returns the properties whose keys are accepted by `filter`.
    fn load_properties_filtered(&self, filter: &dyn Fn(&str) -> bool) -> Result<PropertySet> {
        Ok(self.load_properties()?.filtered(filter))
    }

    /// Reads the backing resource now if it has not been read yet.
    fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Re-reads the backing resource if `pattern` matches this source.
    ///
    /// `None` matches every source. Returns whether the source was reloaded.
    fn reload(&self, _pattern: Option<&str>) -> Result<bool> {
        Ok(false)
    }

    /// Drops any cached content so the next access reads the resource again.
    fn clear(&self) {}
}
