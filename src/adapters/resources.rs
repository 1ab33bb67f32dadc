// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource loaders and registries.
//!
//! [`DirectoryResourceLoader`] resolves `classpath:` resources against a list
//! of search directories. [`InMemoryResourceLoader`] and [`InMemoryRegistry`]
//! hold their content in memory and are mostly useful in tests and for
//! embedding defaults into a binary.

use crate::domain::{PropertiesError, Result};
use crate::ports::{PropertiesRegistry, ResourceLoader};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;

/// Resource loader searching a list of root directories in order.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::DirectoryResourceLoader;
/// use hexprops::ports::ResourceLoader;
///
/// let loader = DirectoryResourceLoader::new(vec!["conf".into(), "/etc/myapp".into()]);
/// assert!(loader.open("does-not-exist.properties").unwrap().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectoryResourceLoader {
    roots: Vec<PathBuf>,
}

impl DirectoryResourceLoader {
    /// Creates a loader searching `roots` in order.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Creates a loader searching the current directory, then the platform
    /// configuration directory of the application.
    ///
    /// On Linux the second root is `~/.config/<app_name>`.
    pub fn with_defaults(app_name: &str, qualifier: &str) -> Self {
        let mut roots = vec![PathBuf::from(".")];
        if let Some(dirs) = ProjectDirs::from(qualifier, "", app_name) {
            roots.push(dirs.config_dir().to_path_buf());
        }
        Self { roots }
    }

    /// Adds a root searched after the existing ones.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Returns the search roots.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Resource names are relative; `..` and absolute paths never escape a root.
fn is_relative_resource(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl ResourceLoader for DirectoryResourceLoader {
    fn open(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let resource = Path::new(path.trim_start_matches('/'));
        if !is_relative_resource(resource) {
            return Err(PropertiesError::InvalidLocation {
                location: format!("classpath:{}", path),
                message: "resource path must stay inside the search roots".to_string(),
            });
        }

        for root in &self.roots {
            let candidate = root.join(resource);
            match fs::read(&candidate) {
                Ok(content) => {
                    tracing::debug!("Found resource '{}' at {:?}", path, candidate);
                    return Ok(Some(content));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(PropertiesError::SourceLoad {
                        location: format!("classpath:{}", path),
                        message: format!("Failed to read {:?}", candidate),
                        source: Some(Box::new(e)),
                    })
                }
            }
        }
        Ok(None)
    }
}

/// Resource loader holding resources in memory.
#[derive(Debug, Default)]
pub struct InMemoryResourceLoader {
    resources: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryResourceLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource.
    pub fn with_resource(self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Adds or replaces a resource.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        if let Ok(mut resources) = self.resources.write() {
            resources.insert(path.into(), content.into());
        }
    }
}

impl ResourceLoader for InMemoryResourceLoader {
    fn open(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .resources
            .read()
            .ok()
            .and_then(|resources| resources.get(path.trim_start_matches('/')).cloned()))
    }
}

/// Registry of named property maps for `ref:` locations.
///
/// # Examples
///
/// ```rust
/// use hexprops::adapters::InMemoryRegistry;
/// use hexprops::ports::PropertiesRegistry;
/// use std::collections::HashMap;
///
/// let registry = InMemoryRegistry::new();
/// registry.bind("myProps", HashMap::from([("a".to_string(), "1".to_string())]));
/// assert!(registry.lookup("myProps").is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a property map to a name, replacing any previous binding.
    pub fn bind(&self, name: impl Into<String>, properties: HashMap<String, String>) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(name.into(), properties);
        }
    }

    /// Removes a binding.
    pub fn unbind(&self, name: &str) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(name).is_some())
            .unwrap_or(false)
    }
}

impl PropertiesRegistry for InMemoryRegistry {
    fn lookup(&self, name: &str) -> Option<HashMap<String, String>> {
        self.entries.read().ok().and_then(|e| e.get(name).cloned())
    }
}
