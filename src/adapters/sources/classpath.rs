// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties source for `classpath:` locations.

use super::{matches_pattern, missing_resource, parse_content, LoadedProperties};
use crate::adapters::formats::PropertiesEncoding;
use crate::domain::{Location, PropertySet, Result};
use crate::ports::{PropertiesSource, ResourceLoader};
use std::fmt;
use std::sync::Arc;

/// Properties source reading a named resource through a [`ResourceLoader`].
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::{ClasspathSource, InMemoryResourceLoader};
/// use hexprops::ports::PropertiesSource;
/// use std::sync::Arc;
///
/// let loader = InMemoryResourceLoader::new().with_resource("app.properties", "cool.name=Camel");
/// let source = ClasspathSource::new("classpath:app.properties".parse().unwrap(), Arc::new(loader));
/// assert_eq!(source.get_property("cool.name").unwrap().as_deref(), Some("Camel"));
/// ```
pub struct ClasspathSource {
    location: Location,
    name: String,
    loader: Arc<dyn ResourceLoader>,
    encoding: PropertiesEncoding,
    ignore_missing: bool,
    loaded: LoadedProperties,
}

impl fmt::Debug for ClasspathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClasspathSource")
            .field("location", &self.location)
            .field("encoding", &self.encoding)
            .field("ignore_missing", &self.ignore_missing)
            .finish()
    }
}

impl ClasspathSource {
    /// Creates a source for `location` opened through `loader`.
    pub fn new(location: Location, loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            name: location.label(),
            location,
            loader,
            encoding: PropertiesEncoding::default(),
            ignore_missing: false,
            loaded: LoadedProperties::new(),
        }
    }

    /// Sets the encoding used for `.properties` resources.
    pub fn with_encoding(mut self, encoding: PropertiesEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Treats a missing resource as empty even when the location is not optional.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    fn read(&self) -> Result<PropertySet> {
        match self.loader.open(self.location.path())? {
            Some(content) => {
                let set = parse_content(&self.location, &content, self.encoding)?;
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

impl PropertiesSource for ClasspathSource {
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
