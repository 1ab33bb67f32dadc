// SPDX-License-Identifier: MIT OR Apache-2.0

//! When environment variables and system properties are consulted.

use crate::domain::errors::{PropertiesError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Controls where in the resolution chain a dimension (environment variables
/// or system properties) is consulted.
///
/// # Examples
///
/// ```
/// use hexprops::domain::PropertiesMode;
///
/// let mode: PropertiesMode = "fallback".parse().unwrap();
/// assert_eq!(mode, PropertiesMode::Fallback);
/// assert_eq!(PropertiesMode::default(), PropertiesMode::Override);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertiesMode {
    /// Never consulted.
    Never,
    /// Consulted after every other source, before the default value.
    Fallback,
    /// Consulted before any other source.
    #[default]
    Override,
}

impl fmt::Display for PropertiesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertiesMode::Never => "never",
            PropertiesMode::Fallback => "fallback",
            PropertiesMode::Override => "override",
        })
    }
}

impl FromStr for PropertiesMode {
    type Err = PropertiesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "never" => Ok(PropertiesMode::Never),
            "fallback" => Ok(PropertiesMode::Fallback),
            "override" => Ok(PropertiesMode::Override),
            _ => Err(PropertiesError::Parse {
                message: format!("unknown properties mode '{}'", s),
                source: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("NEVER".parse::<PropertiesMode>().unwrap(), PropertiesMode::Never);
        assert_eq!("Override".parse::<PropertiesMode>().unwrap(), PropertiesMode::Override);
        assert!("sometimes".parse::<PropertiesMode>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertiesMode::Fallback.to_string(), "fallback");
    }
}
