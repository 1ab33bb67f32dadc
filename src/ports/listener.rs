// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup listener trait definition.

/// Error type a listener may return; it is logged and discarded.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Observes every successful property lookup.
///
/// Listeners are an observability hook. A listener that returns an error or
/// panics never aborts the resolution in progress: the failure is logged and
/// swallowed.
///
/// Any `Fn(&str, &str, Option<&str>, &str)` closure is a listener.
///
/// # Examples
///
/// ```rust
/// use hexprops::ports::PropertiesLookupListener;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
/// let listener = move |name: &str, value: &str, _default: Option<&str>, source: &str| {
///     sink.lock().unwrap().push(format!("{}={} ({})", name, value, source));
/// };
///
/// listener.on_lookup("a", "1", None, "initial").unwrap();
/// assert_eq!(seen.lock().unwrap()[0], "a=1 (initial)");
/// ```
pub trait PropertiesLookupListener: Send + Sync {
    /// Called after `name` was resolved to `value` by the source labelled `source`.
    fn on_lookup(
        &self,
        name: &str,
        value: &str,
        default_value: Option<&str>,
        source: &str,
    ) -> std::result::Result<(), ListenerError>;
}

impl<F> PropertiesLookupListener for F
where
    F: Fn(&str, &str, Option<&str>, &str) + Send + Sync,
{
    fn on_lookup(
        &self,
        name: &str,
        value: &str,
        default_value: Option<&str>,
        source: &str,
    ) -> std::result::Result<(), ListenerError> {
        self(name, value, default_value, source);
        Ok(())
    }
}
