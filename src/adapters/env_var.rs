// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable adapter.
//!
//! This module provides the [`Environment`] implementation used by the
//! lookup chain and by the `env` function.

use crate::ports::Environment;
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable names (prevents DoS)
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values (prevents DoS)
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Environment adapter reading process environment variables.
///
/// Variables are read live on every lookup, so changes made with
/// `std::env::set_var` are visible immediately. An adapter created with
/// [`EnvVarAdapter::with_values`] answers from a fixed map instead.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::EnvVarAdapter;
/// use hexprops::ports::Environment;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("MY_COOL_KEY".to_string(), "value".to_string());
///
/// let env = EnvVarAdapter::with_values(values);
/// assert_eq!(env.lookup("my.cool-key").as_deref(), Some("value"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvVarAdapter {
    /// Fixed values replacing the process environment
    values: Option<HashMap<String, String>>,
}

impl EnvVarAdapter {
    /// Creates an adapter reading the process environment.
    pub fn new() -> Self {
        Self { values: None }
    }

    /// Creates an adapter with pre-populated values.
    ///
    /// **Note**: This method is primarily intended for testing. The process
    /// environment is never consulted by such an adapter.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            values: Some(values),
        }
    }
}

impl Environment for EnvVarAdapter {
    fn var(&self, name: &str) -> Option<String> {
        if name.is_empty() || name.len() > MAX_ENV_KEY_LEN {
            return None;
        }

        let value = match &self.values {
            Some(values) => values.get(name).cloned(),
            None => env::var(name).ok(),
        }?;

        if value.len() > MAX_ENV_VALUE_LEN {
            tracing::debug!(
                "Skipping oversized environment variable '{}': value_len={} (max {})",
                name,
                value.len(),
                MAX_ENV_VALUE_LEN
            );
            return None;
        }
        Some(value)
    }
}
