// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) through which the
//! resolver reaches property stores, functions, the environment, resources
//! and observers. They are implemented by adapters in the adapters layer.

pub mod environment;
pub mod format;
pub mod function;
pub mod listener;
pub mod resources;
pub mod source;
pub mod watcher;

// Re-export commonly used types
pub use environment::Environment;
pub use format::PropertiesFormat;
pub use function::PropertiesFunction;
pub use listener::{ListenerError, PropertiesLookupListener};
pub use resources::{PropertiesRegistry, ResourceLoader};
pub use source::{PropertiesSource, DEFAULT_SOURCE_PRIORITY};
pub use watcher::{ChangeCallback, LocationWatcher};
