// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers shared by the integration tests.

use hexprops::adapters::{EnvVarAdapter, SystemProperties};
use hexprops::ports::{ListenerError, PropertiesLookupListener, PropertiesRegistry};
use hexprops::service::{PropertiesComponent, PropertiesComponentBuilder};
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// A builder that does not see the process environment or the global
/// system properties.
#[allow(dead_code)]
pub fn isolated() -> PropertiesComponentBuilder {
    isolated_with_env(&[])
}

/// Like [`isolated`], with a fixed set of environment variables.
#[allow(dead_code)]
pub fn isolated_with_env(vars: &[(&str, &str)]) -> PropertiesComponentBuilder {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    PropertiesComponent::builder()
        .with_environment(Arc::new(EnvVarAdapter::with_values(vars)))
        .with_system_properties(SystemProperties::new())
}

/// Writes `content` to a temporary file with the given extension.
#[allow(dead_code)]
pub fn temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A registry counting how often it is asked for a property map.
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingRegistry {
    maps: Mutex<HashMap<String, HashMap<String, String>>>,
    lookups: AtomicUsize,
}

#[allow(dead_code)]
impl CountingRegistry {
    pub fn with_map(self, name: &str, pairs: &[(&str, &str)]) -> Self {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.maps.lock().unwrap().insert(name.to_string(), map);
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl PropertiesRegistry for CountingRegistry {
    fn lookup(&self, name: &str) -> Option<HashMap<String, String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.maps.lock().unwrap().get(name).cloned()
    }
}

/// A listener remembering every `(name, value, source)` it was told about.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingListener {
    pub seen: Mutex<Vec<(String, String, String)>>,
}

#[allow(dead_code)]
impl RecordingListener {
    pub fn names(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect()
    }
}

impl PropertiesLookupListener for RecordingListener {
    fn on_lookup(
        &self,
        name: &str,
        value: &str,
        _default_value: Option<&str>,
        source: &str,
    ) -> Result<(), ListenerError> {
        self.seen
            .lock()
            .unwrap()
            .push((name.to_string(), value.to_string(), source.to_string()));
        Ok(())
    }
}
