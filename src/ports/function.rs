// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties function trait definition.
//!
//! A properties function is a named mini procedure invoked with the
//! `{{name:argument}}` syntax instead of a plain key lookup.

use crate::domain::tokens::OPTIONAL_TOKEN;

/// A function callable from a placeholder.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::PropertiesFunction;
///
/// struct Upper;
///
/// impl PropertiesFunction for Upper {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn apply(&self, remainder: &str) -> Option<String> {
///         Some(remainder.to_uppercase())
///     }
/// }
///
/// let function = Upper;
/// assert_eq!(function.apply("abc").as_deref(), Some("ABC"));
/// assert!(function.optional("?abc"));
/// assert!(!function.lookup_first("abc"));
/// ```
pub trait PropertiesFunction: Send + Sync {
    /// The name used before the colon in a placeholder.
    fn name(&self) -> &str;

    /// Applies the function to the text after `name:`.
    ///
    /// `None` is a function-specific miss; the parser decides whether that
    /// is fatal.
    fn apply(&self, remainder: &str) -> Option<String>;

    /// Whether a miss for this remainder is tolerated.
    ///
    /// By default a remainder starting with `?` is optional.
    fn optional(&self, remainder: &str) -> bool {
        remainder.starts_with(OPTIONAL_TOKEN)
    }

    /// Whether the remainder is a property key to resolve before `apply`.
    fn lookup_first(&self, _remainder: &str) -> bool {
        false
    }
}
