// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the placeholder resolver.
//!
//! This module defines every error that can surface from `resolve` and from
//! loading property sources. All errors use `thiserror` for proper error
//! handling and conversion.

use thiserror::Error;

/// The main error type for property resolution.
///
/// Parse-time errors (`UnbalancedToken`, `KeyNotFound`, `CircularReference`,
/// `FunctionReturnedNull`, `InvalidGetOrElseSyntax`) always carry the input
/// text verbatim so that a failure can be traced back to the string that
/// caused it. It is marked as `#[non_exhaustive]` to allow for future
/// additions without breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use hexprops::domain::errors::PropertiesError;
///
/// let error = PropertiesError::KeyNotFound {
///     key: "cool.name".to_string(),
///     text: "{{cool.name}}".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Property with key [cool.name] not found in properties from text: {{cool.name}}"
/// );
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PropertiesError {
    /// A prefix token without a suffix token, or the other way around.
    #[error("Missing {missing} from the text: {text}")]
    UnbalancedToken {
        /// The token that could not be found
        missing: String,
        /// The input text
        text: String,
    },

    /// A required key was not found in any source.
    #[error("Property with key [{key}] not found in properties from text: {text}")]
    KeyNotFound {
        /// The key that was not found
        key: String,
        /// The input text
        text: String,
    },

    /// A key appeared again on its own resolution path.
    #[error("Circular reference detected with key [{key}] from text: {text}")]
    CircularReference {
        /// The key that was revisited
        key: String,
        /// The input text
        text: String,
    },

    /// A function returned no value for a required placeholder.
    #[error(
        "Property with key [{key}] using function [{function}] returned null value which is not allowed, from input: {text}"
    )]
    FunctionReturnedNull {
        /// The full placeholder key, including the function name
        key: String,
        /// The function name
        function: String,
        /// The input text
        text: String,
    },

    /// A get-or-else expression without a key, such as `{{:value}}`.
    #[error("Invalid get-or-else syntax in key [{key}] from text: {text}")]
    InvalidGetOrElseSyntax {
        /// The offending key expression
        key: String,
        /// The input text
        text: String,
    },

    /// Reading a backing resource failed for a reason other than absence.
    #[error("Failed to load properties from location '{location}': {message}")]
    SourceLoad {
        /// The location being loaded
        location: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backing resource does not exist and the location is not optional.
    #[error("Properties location '{location}' not found")]
    MissingLocation {
        /// The location that was not found
        location: String,
    },

    /// A location string could not be parsed or expanded.
    #[error("Invalid properties location '{location}': {message}")]
    InvalidLocation {
        /// The location string
        location: String,
        /// The error message
        message: String,
    },

    /// Failed to parse the content of a properties resource.
    #[error("Failed to parse properties: {message}")]
    Parse {
        /// The error message
        message: String,
        /// The underlying parsing error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in a location watcher.
    #[error("Properties watcher error: {message}")]
    Watcher {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading properties.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PropertiesError {
    /// Returns the placeholder key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            PropertiesError::KeyNotFound { key, .. }
            | PropertiesError::CircularReference { key, .. }
            | PropertiesError::FunctionReturnedNull { key, .. }
            | PropertiesError::InvalidGetOrElseSyntax { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// A specialized Result type for property operations.
pub type Result<T> = std::result::Result<T, PropertiesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_found_message() {
        let error = PropertiesError::KeyNotFound {
            key: "foo".to_string(),
            text: "hello {{foo}}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Property with key [foo] not found in properties from text: hello {{foo}}"
        );
    }

    #[test]
    fn test_circular_reference_message() {
        let error = PropertiesError::CircularReference {
            key: "a".to_string(),
            text: "{{a}}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Circular reference detected with key [a] from text: {{a}}"
        );
    }

    #[test]
    fn test_unbalanced_token_message() {
        let error = PropertiesError::UnbalancedToken {
            missing: "}}".to_string(),
            text: "{{foo".to_string(),
        };
        assert_eq!(error.to_string(), "Missing }} from the text: {{foo");
    }

    #[test]
    fn test_function_returned_null_message() {
        let error = PropertiesError::FunctionReturnedNull {
            key: "env:FOO".to_string(),
            function: "env".to_string(),
            text: "{{env:FOO}}".to_string(),
        };
        assert!(error.to_string().contains("[env:FOO]"));
        assert!(error.to_string().contains("[env]"));
        assert!(error.to_string().contains("{{env:FOO}}"));
    }

    #[test]
    fn test_error_key() {
        let error = PropertiesError::InvalidGetOrElseSyntax {
            key: ":x".to_string(),
            text: "{{:x}}".to_string(),
        };
        assert_eq!(error.key(), Some(":x"));

        let error = PropertiesError::MissingLocation {
            location: "file:/nope".to_string(),
        };
        assert_eq!(error.key(), None);
    }

    #[test]
    fn test_source_load_error() {
        let error = PropertiesError::SourceLoad {
            location: "file:app.properties".to_string(),
            message: "permission denied".to_string(),
            source: None,
        };
        assert_eq!(
            error.to_string(),
            "Failed to load properties from location 'file:app.properties': permission denied"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = PropertiesError::from(io_error);
        assert!(matches!(error, PropertiesError::Io(_)));
    }
}
