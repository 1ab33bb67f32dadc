// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property resource formats.
//!
//! [`JavaPropertiesFormat`] reads the classic `key=value` properties format;
//! [`YamlFormat`] flattens YAML documents into dotted keys. The format of a
//! resource is chosen by its file extension, see [`format_for_path`].

use crate::domain::{PropertiesError, Result};
use crate::ports::PropertiesFormat;
use java_properties::PropertiesIter;

/// Character encoding of a properties file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PropertiesEncoding {
    /// ISO-8859-1, the traditional properties file encoding.
    ///
    /// Decoded as Windows-1252, the superset `encoding_rs` maps the
    /// ISO-8859-1 label to and the default of `java-properties`. Bytes
    /// 0x80 to 0x9F therefore decode to printable characters such as `€`
    /// instead of C1 control codes.
    #[default]
    Latin1,
    /// UTF-8.
    Utf8,
}

impl PropertiesEncoding {
    fn encoding(self) -> &'static encoding_rs::Encoding {
        match self {
            PropertiesEncoding::Latin1 => encoding_rs::WINDOWS_1252,
            PropertiesEncoding::Utf8 => encoding_rs::UTF_8,
        }
    }
}

/// Parser for the `key=value` properties format.
///
/// Supports `=`, `:` and whitespace separators, `#` and `!` comment lines,
/// backslash line continuations and the `\t \n \r \f \uXXXX` escapes.
/// Leading whitespace of a value is dropped by the format itself.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::JavaPropertiesFormat;
/// use hexprops::ports::PropertiesFormat;
///
/// let format = JavaPropertiesFormat::new();
/// let pairs = format.parse(b"# comment\ncool.name = Camel\ncool.multi = a \\\n    b\n").unwrap();
/// assert_eq!(pairs[0], ("cool.name".to_string(), "Camel".to_string()));
/// assert_eq!(pairs[1], ("cool.multi".to_string(), "a b".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JavaPropertiesFormat {
    encoding: PropertiesEncoding,
}

impl JavaPropertiesFormat {
    /// Creates a parser reading ISO-8859-1 content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser for the given encoding.
    pub fn with_encoding(encoding: PropertiesEncoding) -> Self {
        Self { encoding }
    }

    /// Returns the encoding.
    pub fn encoding(&self) -> PropertiesEncoding {
        self.encoding
    }
}

impl PropertiesFormat for JavaPropertiesFormat {
    fn parse(&self, content: &[u8]) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::new();
        PropertiesIter::new_with_encoding(content, self.encoding.encoding())
            .read_into(|key, value| pairs.push((key, value)))
            .map_err(|e| PropertiesError::Parse {
                message: format!("Failed to parse properties: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(pairs)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties", "cfg", "conf"]
    }
}

/// YAML parser flattening documents into dotted keys.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::YamlFormat;
/// use hexprops::ports::PropertiesFormat;
///
/// let pairs = YamlFormat::new().parse(b"database:\n  host: localhost\n  port: 5432").unwrap();
/// assert!(pairs.contains(&("database.host".to_string(), "localhost".to_string())));
/// ```
#[cfg(feature = "yaml")]
#[derive(Debug, Clone, Default)]
pub struct YamlFormat;

#[cfg(feature = "yaml")]
impl YamlFormat {
    /// Creates a new YAML parser.
    pub fn new() -> Self {
        YamlFormat
    }

    fn flatten(value: &serde_yaml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
        match value {
            serde_yaml::Value::Mapping(map) => {
                for (key, val) in map {
                    if let Some(key_str) = key.as_str() {
                        let new_prefix = if prefix.is_empty() {
                            key_str.to_string()
                        } else {
                            format!("{}.{}", prefix, key_str)
                        };
                        Self::flatten(val, &new_prefix, out);
                    }
                }
            }
            serde_yaml::Value::Sequence(seq) => {
                for (i, val) in seq.iter().enumerate() {
                    Self::flatten(val, &format!("{}.{}", prefix, i), out);
                }
            }
            serde_yaml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
            serde_yaml::Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
            serde_yaml::Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
            serde_yaml::Value::Null => out.push((prefix.to_string(), String::new())),
            _ => {}
        }
    }
}

#[cfg(feature = "yaml")]
impl PropertiesFormat for YamlFormat {
    fn parse(&self, content: &[u8]) -> Result<Vec<(String, String)>> {
        let value: serde_yaml::Value =
            serde_yaml::from_slice(content).map_err(|e| PropertiesError::Parse {
                message: format!("Failed to parse YAML: {}", e),
                source: Some(Box::new(e)),
            })?;

        let mut out = Vec::new();
        Self::flatten(&value, "", &mut out);
        Ok(out)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}

/// Picks the format for a resource path by its extension.
///
/// Anything that is not a YAML file is read as a properties file.
pub fn format_for_path(path: &str, encoding: PropertiesEncoding) -> Box<dyn PropertiesFormat> {
    #[cfg(feature = "yaml")]
    {
        let yaml = YamlFormat::new();
        let extension = std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if let Some(extension) = extension {
            if yaml.supported_extensions().contains(&extension.as_str()) {
                return Box::new(yaml);
            }
        }
    }
    #[cfg(not(feature = "yaml"))]
    let _ = path;

    Box::new(JavaPropertiesFormat::with_encoding(encoding))
}
