// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the placeholder resolver.
//!
//! [`PropertiesParser`] finds and substitutes placeholders, asking a
//! [`PlaceholderLookup`] for every key. [`ResolutionChain`] is the lookup used
//! by [`PropertiesComponent`], which ties sources, functions and listeners
//! together behind a lifecycle.

pub mod component;
pub mod lookup;
pub mod parser;

// Re-export commonly used types
pub use component::{
    ComponentState, PropertiesComponent, PropertiesComponentBuilder, ResolveOptions,
};
pub use lookup::{CustomLookup, LocalProperties, PropertiesLookup, ResolutionChain};
pub use parser::{ParseOptions, PlaceholderLookup, PropertiesParser};
