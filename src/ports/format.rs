// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties format trait definition.
//!
//! This module defines the `PropertiesFormat` trait, which turns the raw
//! bytes of a properties resource into flat key/value pairs.

use crate::domain::Result;

/// A trait for parsing property resources.
///
/// Nested formats should flatten their structure using dot notation, so that
///
/// ```yaml
/// database:
///   host: localhost
/// ```
///
/// becomes `database.host` -> `"localhost"`.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::PropertiesFormat;
/// use hexprops::domain::Result;
///
/// struct Lines;
///
/// impl PropertiesFormat for Lines {
///     fn parse(&self, content: &[u8]) -> Result<Vec<(String, String)>> {
///         Ok(String::from_utf8_lossy(content)
///             .lines()
///             .filter_map(|line| line.split_once('='))
///             .map(|(k, v)| (k.to_string(), v.to_string()))
///             .collect())
///     }
///
///     fn supported_extensions(&self) -> &[&str] {
///         &["lines"]
///     }
/// }
///
/// let pairs = Lines.parse(b"a=1\nb=2").unwrap();
/// assert_eq!(pairs.len(), 2);
/// ```
pub trait PropertiesFormat: Send + Sync {
    /// Parses raw content into key/value pairs in document order.
    fn parse(&self, content: &[u8]) -> Result<Vec<(String, String)>>;

    /// Returns the file extensions (without the leading dot) this format handles.
    fn supported_extensions(&self) -> &[&str];
}
