// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types.
//!
//! This module contains the fundamental concepts of placeholder resolution:
//! locations, property sets, token syntax, resolution modes, audit records
//! and errors. It is independent of any I/O concerns.

pub mod errors;
pub mod location;
pub mod mode;
pub mod property_set;
pub mod resolved_value;
pub mod tokens;

// Re-export commonly used types
pub use errors::{PropertiesError, Result};
pub use location::{Location, LocationResolver};
pub use mode::PropertiesMode;
pub use property_set::{PropertyEntry, PropertySet};
pub use resolved_value::{AuditTrail, ResolvedValue};
pub use tokens::TokenConfig;
