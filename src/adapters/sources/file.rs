// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem backed properties source.

use super::{matches_pattern, missing_resource, parse_content, LoadedProperties};
use crate::adapters::formats::PropertiesEncoding;
use crate::domain::{Location, LocationResolver, PropertiesError, PropertySet, Result};
use crate::ports::PropertiesSource;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Maximum allowed size of a properties file (10MB).
const MAX_PROPERTIES_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Properties source for a `file:` location.
///
/// The file is read once, on first access or on [`PropertiesSource::load`],
/// and cached until [`PropertiesSource::reload`] or [`PropertiesSource::clear`].
///
/// # Examples
///
/// ```rust,no_run
/// use hexprops::adapters::FileSource;
/// use hexprops::ports::PropertiesSource;
///
/// let source = FileSource::new("/etc/myapp/app.properties");
/// let host = source.get_property("db.host").unwrap();
/// ```
#[derive(Debug)]
pub struct FileSource {
    location: Location,
    name: String,
    encoding: PropertiesEncoding,
    ignore_missing: bool,
    loaded: LoadedProperties,
}

impl FileSource {
    /// Creates a source for a required file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let location = Location::new(
            LocationResolver::File,
            path.as_ref().to_string_lossy(),
            false,
        );
        Self::from_location(location)
    }

    /// Creates a source for a `file:` location.
    pub fn from_location(location: Location) -> Self {
        Self {
            name: location.label(),
            location,
            encoding: PropertiesEncoding::default(),
            ignore_missing: false,
            loaded: LoadedProperties::new(),
        }
    }

    /// Sets the encoding used for `.properties` files.
    pub fn with_encoding(mut self, encoding: PropertiesEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Treats a missing file as empty even when the location is not optional.
    pub fn ignore_missing(mut self, ignore: bool) -> Self {
        self.ignore_missing = ignore;
        self
    }

    /// Returns the path of the file.
    pub fn file_path(&self) -> PathBuf {
        PathBuf::from(self.location.path())
    }

    fn read(&self) -> Result<PropertySet> {
        let path = self.file_path();

        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return missing_resource(&self.location, self.ignore_missing)
            }
            Err(e) => {
                return Err(PropertiesError::SourceLoad {
                    location: self.location.label(),
                    message: "Failed to read file metadata".to_string(),
                    source: Some(Box::new(e)),
                })
            }
        };

        if metadata.len() > MAX_PROPERTIES_FILE_SIZE {
            return Err(PropertiesError::SourceLoad {
                location: self.location.label(),
                message: format!(
                    "Properties file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_PROPERTIES_FILE_SIZE
                ),
                source: None,
            });
        }

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return missing_resource(&self.location, self.ignore_missing)
            }
            Err(e) => {
                return Err(PropertiesError::SourceLoad {
                    location: self.location.label(),
                    message: "Failed to read properties file".to_string(),
                    source: Some(Box::new(e)),
                })
            }
        };

        let set = parse_content(&self.location, &content, self.encoding)?;
        tracing::debug!(
            "Loaded {} properties from '{}'",
            set.len(),
            self.location.label()
        );
        Ok(set)
    }
}

impl PropertiesSource for FileSource {
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
        tracing::debug!("Reloaded properties from '{}'", self.location.label());
        Ok(true)
    }

    fn clear(&self) {
        self.loaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_properties(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".properties")
            .tempfile()
            .unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_file_source_get() {
        let file = temp_properties("cool.name=Camel\n");
        let source = FileSource::new(file.path());
        assert_eq!(
            source.get_property("cool.name").unwrap().as_deref(),
            Some("Camel")
        );
        assert!(source.get_property("nope").unwrap().is_none());
        assert_eq!(source.priority(), 1);
        assert!(source.name().starts_with("file:"));
    }

    #[test]
    fn test_file_source_trims_trailing_spaces() {
        let file = temp_properties("key= value   \ntab=x\\t\n");
        let source = FileSource::new(file.path());
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("value"));
        assert_eq!(source.get_property("tab").unwrap().as_deref(), Some("x\t"));
    }

    #[test]
    fn test_file_source_missing_required() {
        let source = FileSource::new("/nonexistent/path/app.properties");
        assert!(matches!(
            source.load(),
            Err(PropertiesError::MissingLocation { .. })
        ));
    }

    #[test]
    fn test_file_source_missing_optional() {
        let location: Location = "file:/nonexistent/app.properties;optional=true"
            .parse()
            .unwrap();
        let source = FileSource::from_location(location);
        assert!(source.load().is_ok());
        assert!(source.get_property("a").unwrap().is_none());
    }

    #[test]
    fn test_file_source_missing_ignored() {
        let source = FileSource::new("/nonexistent/app.properties").ignore_missing(true);
        assert!(source.load_properties().unwrap().is_empty());
    }

    #[test]
    fn test_file_source_reads_once_until_reload() {
        let file = temp_properties("key=initial\n");
        let source = FileSource::new(file.path());
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("initial"));

        fs::write(file.path(), "key=updated\n").unwrap();
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("initial"));

        assert!(!source.reload(Some("classpath:*")).unwrap());
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("initial"));

        assert!(source.reload(Some("*.properties")).unwrap());
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("updated"));
    }

    #[test]
    fn test_file_source_clear_forces_reread() {
        let file = temp_properties("key=initial\n");
        let source = FileSource::new(file.path());
        source.load().unwrap();
        fs::write(file.path(), "key=updated\n").unwrap();
        source.clear();
        assert_eq!(source.get_property("key").unwrap().as_deref(), Some("updated"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn test_file_source_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "database:\n  host: localhost").unwrap();
        let source = FileSource::new(file.path());
        assert_eq!(
            source.get_property("database.host").unwrap().as_deref(),
            Some("localhost")
        );
    }

    #[test]
    fn test_file_source_utf8() {
        let file = temp_properties("name=café\n");
        let source = FileSource::new(file.path()).with_encoding(PropertiesEncoding::Utf8);
        assert_eq!(source.get_property("name").unwrap().as_deref(), Some("café"));
    }
}
