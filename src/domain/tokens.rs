// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder token syntax.

use crate::domain::errors::{PropertiesError, Result};

/// Default placeholder prefix.
pub const DEFAULT_PREFIX: &str = "{{";

/// Default placeholder suffix.
pub const DEFAULT_SUFFIX: &str = "}}";

/// Marks a key as optional: `{{?key}}`.
pub const OPTIONAL_TOKEN: &str = "?";

/// Separates a key from its default value: `{{key:default}}`.
pub const GET_OR_ELSE_TOKEN: &str = ":";

/// Negates a boolean result when it opens the whole input: `{{!key}}`.
pub const NEGATE_TOKEN: &str = "!";

/// Escape character defeating placeholder interpretation: `\{{key}}`.
pub const ESCAPE_CHAR: char = '\\';

/// Internal marker opening a placeholder that was deliberately left unresolved.
///
/// Unicode noncharacters are reserved for process-internal use and never
/// show up in configuration text.
pub(crate) const UNRESOLVED_PREFIX: &str = "\u{FDD0}";

/// Internal marker closing a placeholder that was deliberately left unresolved.
pub(crate) const UNRESOLVED_SUFFIX: &str = "\u{FDD1}";

/// The prefix and suffix delimiting a placeholder.
///
/// # Examples
///
/// ```
/// use hexprops::domain::TokenConfig;
///
/// let tokens = TokenConfig::default();
/// assert_eq!(tokens.prefix(), "{{");
/// assert_eq!(tokens.suffix(), "}}");
///
/// let tokens = TokenConfig::new("${", "}").unwrap();
/// assert_eq!(tokens.prefix(), "${");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenConfig {
    prefix: String,
    suffix: String,
}

impl TokenConfig {
    /// Creates a token configuration; both tokens must be non-empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if prefix.is_empty() || suffix.is_empty() {
            return Err(PropertiesError::Parse {
                message: "placeholder prefix and suffix must not be empty".to_string(),
                source: None,
            });
        }
        Ok(Self { prefix, suffix })
    }

    /// Returns the prefix token.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the suffix token.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Wraps a key in the prefix and suffix tokens.
    pub fn wrap(&self, key: &str) -> String {
        format!("{}{}{}", self.prefix, key, self.suffix)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tokens() {
        let tokens = TokenConfig::default();
        assert_eq!(tokens.wrap("a"), "{{a}}");
    }

    #[test]
    fn test_custom_tokens() {
        let tokens = TokenConfig::new("[[", "]]").unwrap();
        assert_eq!(tokens.wrap("a"), "[[a]]");
    }

    #[test]
    fn test_empty_tokens_rejected() {
        assert!(TokenConfig::new("", "}}").is_err());
        assert!(TokenConfig::new("{{", "").is_err());
    }
}
