// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resource and registry ports backing `classpath:` and `ref:` locations.

use crate::domain::Result;
use std::collections::HashMap;

/// Opens named resources for `classpath:` locations.
pub trait ResourceLoader: Send + Sync {
    /// Returns the content of the resource, or `Ok(None)` when it does not exist.
    ///
    /// Errors other than absence are reported as errors.
    fn open(&self, path: &str) -> Result<Option<Vec<u8>>>;
}

/// Looks up named property maps for `ref:` locations.
pub trait PropertiesRegistry: Send + Sync {
    /// Returns the property map bound to `name`, if any.
    fn lookup(&self, name: &str) -> Option<HashMap<String, String>>;
}
