// SPDX-License-Identifier: MIT OR Apache-2.0

//! A hexagonal architecture property placeholder resolver.
//!
//! This crate resolves `{{key}}` placeholders in strings against layered
//! property sources: call-scoped local properties, overrides, properties
//! files, resources, registry entries, the environment, system properties
//! and initial defaults. Placeholders nest, can be optional (`{{?key}}`),
//! carry a default (`{{key:default}}`), be negated (`{{!flag}}`) or be handed
//! to a function (`{{env:HOME}}`).
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`Location`, `PropertySet`, `TokenConfig`, errors)
//! - **Ports**: Trait definitions (`PropertiesSource`, `PropertiesFunction`, `Environment`)
//! - **Adapters**: Sources, file formats, resource loaders and built-in functions
//! - **Service**: The parser, the lookup chain and the `PropertiesComponent` facade
//!
//! # Placeholder Syntax
//!
//! | Syntax                | Meaning                                              |
//! |-----------------------|------------------------------------------------------|
//! | `{{key}}`             | required key                                         |
//! | `{{?key}}`            | optional key, removed when not found                 |
//! | `{{key:default}}`     | key with a default value                             |
//! | `{{!key}}`            | boolean value, negated                               |
//! | `{{fn:remainder}}`    | registered function applied to the remainder         |
//! | `\{{key}}`            | escaped, kept literally without the backslash        |
//!
//! Placeholders inside single or double quotes are not resolved.
//!
//! # Feature Flags
//!
//! - `yaml`: Read `.yaml`/`.yml` locations, flattened to dotted keys (default)
//! - `reload`: Watch file locations and reload them on change
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust
//! use hexprops::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let component = PropertiesComponent::builder()
//!     .with_initial_property("app.name", "billing")
//!     .with_initial_property("app.url", "http://{{app.host:localhost}}/{{app.name}}")
//!     .build()?;
//! component.start()?;
//!
//! assert_eq!(component.resolve("{{app.url}}")?, "http://localhost/billing");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        Location, PropertiesError, PropertiesMode, PropertySet, ResolvedValue, Result,
    };
    pub use crate::ports::{PropertiesFunction, PropertiesLookupListener, PropertiesSource};
    pub use crate::service::{
        LocalProperties, PropertiesComponent, PropertiesComponentBuilder, ResolveOptions,
    };

    pub use crate::adapters::{
        ClasspathSource, EnvVarAdapter, FileSource, InMemorySource, RefSource, SystemProperties,
    };
    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
}
