// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable access.

/// Read access to environment variables.
///
/// Abstracted so that the resolution chain can be exercised against a fixed
/// set of variables instead of the process environment.
pub trait Environment: Send + Sync {
    /// Returns the variable with exactly this name.
    fn var(&self, name: &str) -> Option<String>;

    /// Looks up a property key as an environment variable.
    ///
    /// The key is upper-cased first. If that is not set, dashes and dots are
    /// replaced by underscores, so `my.cool-key` is found as `MY_COOL_KEY`.
    fn lookup(&self, key: &str) -> Option<String> {
        let upper = key.to_uppercase();
        self.var(&upper).or_else(|| {
            let normalized = upper.replace(['-', '.'], "_");
            if normalized == upper {
                None
            } else {
                self.var(&normalized)
            }
        })
    }
}
