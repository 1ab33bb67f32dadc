// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide system properties.
//!
//! System properties are a mutable key/value map shared by everything in the
//! process, typically populated from `-Dkey=value` command-line arguments.
//! The lookup chain consults them in override or fallback mode and the `sys`
//! function reads them directly.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

static GLOBAL: Lazy<SystemProperties> = Lazy::new(SystemProperties::new);

/// A shared, mutable map of system properties.
///
/// Cloning is cheap and every clone sees the same map. [`SystemProperties::global`]
/// returns the process-wide instance; tests usually build their own with
/// [`SystemProperties::new`] to stay isolated.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::SystemProperties;
///
/// let props = SystemProperties::from_args(vec!["-Dapp.name=demo", "--app.port=8080", "run"]);
/// assert_eq!(props.get("app.name").as_deref(), Some("demo"));
/// assert_eq!(props.get("app.port").as_deref(), Some("8080"));
/// assert!(props.get("run").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl SystemProperties {
    /// Creates an empty, unshared map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide system properties.
    pub fn global() -> SystemProperties {
        GLOBAL.clone()
    }

    /// Creates a map from command-line style arguments.
    ///
    /// Accepted forms are `-Dkey=value`, `--key=value` and `--key value`.
    /// Anything else is ignored. A repeated key keeps the last value.
    pub fn from_args<S: AsRef<str>>(args: Vec<S>) -> Self {
        let props = Self::new();
        props.parse_args(args);
        props
    }

    /// Parses the process arguments into the global map.
    pub fn load_env_args() -> SystemProperties {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let global = Self::global();
        global.parse_args(args);
        global
    }

    fn parse_args<S: AsRef<str>>(&self, args: Vec<S>) {
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();

            if let Some((key, value)) = arg.strip_prefix("-D").and_then(|s| s.split_once('=')) {
                self.set(key, value);
            } else if let Some(flag) = arg.strip_prefix("--") {
                match flag.split_once('=') {
                    Some((key, value)) => {
                        self.set(key, value);
                    }
                    None => {
                        // --key value, unless the next argument is another flag
                        if let Some(next) = args.get(i + 1).map(AsRef::as_ref) {
                            if !next.starts_with('-') {
                                self.set(flag, next);
                                i += 1;
                            }
                        }
                    }
                }
            }
            i += 1;
        }
    }

    /// Returns a property.
    pub fn get(&self, key: &str) -> Option<String> {
        self.values.read().ok().and_then(|v| v.get(key).cloned())
    }

    /// Sets a property, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        if key.is_empty() {
            return None;
        }
        self.values
            .write()
            .ok()
            .and_then(|mut v| v.insert(key, value.into()))
    }

    /// Removes a property, returning its value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().ok().and_then(|mut v| v.remove(key))
    }

    /// Returns a copy of every property.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.read().map(|v| v.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let props = SystemProperties::new();
        assert!(props.set("a", "1").is_none());
        assert_eq!(props.set("a", "2").as_deref(), Some("1"));
        assert_eq!(props.get("a").as_deref(), Some("2"));
        assert_eq!(props.remove("a").as_deref(), Some("2"));
        assert!(props.get("a").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let props = SystemProperties::new();
        let clone = props.clone();
        clone.set("shared", "yes");
        assert_eq!(props.get("shared").as_deref(), Some("yes"));
    }

    #[test]
    fn test_new_is_not_global() {
        let props = SystemProperties::new();
        props.set("hexprops.isolated", "x");
        assert!(SystemProperties::global().get("hexprops.isolated").is_none());
    }

    #[test]
    fn test_from_args_forms() {
        let props = SystemProperties::from_args(vec![
            "-Ddb.url=jdbc:h2:mem;MODE=x",
            "--host",
            "localhost",
            "--flag",
            "--port=8080",
            "positional",
            "-x",
        ]);
        assert_eq!(props.get("db.url").as_deref(), Some("jdbc:h2:mem;MODE=x"));
        assert_eq!(props.get("host").as_deref(), Some("localhost"));
        assert!(props.get("flag").is_none());
        assert_eq!(props.get("port").as_deref(), Some("8080"));
        assert!(props.get("positional").is_none());
        assert_eq!(props.snapshot().len(), 3);
    }

    #[test]
    fn test_from_args_last_wins() {
        let props = SystemProperties::from_args(vec!["-Dk=1", "--k=2"]);
        assert_eq!(props.get("k").as_deref(), Some("2"));
    }

    #[test]
    fn test_empty_key_ignored() {
        let props = SystemProperties::from_args(vec!["-D=value", "--=x"]);
        assert!(props.snapshot().is_empty());
    }
}
