// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing port implementations.
//!
//! This module contains the concrete implementations of the traits defined
//! in the ports layer: property sources for every location resolver, file
//! formats, resource loaders, the environment, system properties, the
//! built-in functions and the file watcher.

pub mod env_var;
pub mod formats;
pub mod functions;
pub mod resources;
pub mod sources;
pub mod system;
pub mod watchers;

pub use env_var::EnvVarAdapter;
#[cfg(feature = "yaml")]
pub use formats::YamlFormat;
pub use formats::{format_for_path, JavaPropertiesFormat, PropertiesEncoding};
pub use functions::{
    BooleanFunction, EnvFunction, FnFunction, FunctionRegistry, ServiceFunction, ServicePart,
    SysFunction,
};
pub use resources::{DirectoryResourceLoader, InMemoryRegistry, InMemoryResourceLoader};
pub use sources::{ClasspathSource, FileSource, InMemorySource, RefSource};
pub use system::SystemProperties;
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
