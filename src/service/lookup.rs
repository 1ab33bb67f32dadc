// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property lookup across the layered sources.
//!
//! [`PropertiesLookup`] walks the property layers in precedence order:
//!
//! 1. local properties passed with the call
//! 2. override properties
//! 3. registered sources, by priority
//! 4. initial properties
//!
//! [`ResolutionChain`] wraps it with the environment, system properties and
//! the custom lookup hook, which are consulted before (override mode) or
//! after (fallback mode) the layers, and notifies listeners of every hit.

use crate::adapters::system::SystemProperties;
use crate::domain::{AuditTrail, Location, PropertiesMode, PropertySet, ResolvedValue, Result};
use crate::ports::{Environment, PropertiesLookupListener, PropertiesSource};
use crate::service::parser::PlaceholderLookup;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

/// Source label for environment variable hits.
pub const ENV_SOURCE: &str = "env";

/// Source label for system property hits.
pub const SYS_SOURCE: &str = "sys";

/// Source label for custom lookup hits.
pub const CUSTOM_SOURCE: &str = "custom";

/// A last-resort lookup hook consulted after every property layer.
pub type CustomLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Memoized lookups of the shared layers: key to value and source label.
pub(crate) type MemoCache = RwLock<HashMap<String, (String, String)>>;

/// Properties scoped to a single resolve call.
///
/// Local properties take precedence over every other layer except
/// environment variables and system properties in override mode.
///
/// # Examples
///
/// ```rust
/// use hexprops::service::LocalProperties;
///
/// let local: LocalProperties = [("cool.name", "Local")].into_iter().collect();
/// assert_eq!(local.get("cool.name"), Some("Local"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalProperties {
    properties: PropertySet,
}

impl LocalProperties {
    /// Creates an empty set of local properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a property.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key, value, Location::local());
    }

    /// Returns a property.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether there are no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Returns the properties as a set.
    pub fn as_set(&self) -> &PropertySet {
        &self.properties
    }
}

impl<K, V> FromIterator<(K, V)> for LocalProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut local = Self::new();
        for (key, value) in iter {
            local.insert(key, value);
        }
        local
    }
}

/// A value found by a lookup and the label of the layer that had it.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Hit {
    value: String,
    source: String,
}

impl Hit {
    fn new(value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }
}

fn find_in(set: &PropertySet, name: &str) -> Option<Hit> {
    set.entry(name)
        .map(|entry| Hit::new(entry.value(), entry.location().label()))
}

/// Lookup through local, override, source and initial properties.
///
/// # Examples
///
/// ```rust
/// use hexprops::domain::{Location, PropertySet};
/// use hexprops::ports::PropertiesSource;
/// use hexprops::service::{LocalProperties, PropertiesLookup};
/// use std::sync::Arc;
///
/// let overrides = PropertySet::from_pairs([("a", "override")], &Location::overrides());
/// let initial = PropertySet::from_pairs([("a", "initial"), ("b", "initial")], &Location::initial());
/// let sources: Vec<Arc<dyn PropertiesSource>> = Vec::new();
/// let local = LocalProperties::new().with_property("b", "local");
///
/// let lookup = PropertiesLookup::new(&overrides, &sources, &initial).with_local(&local);
/// assert_eq!(lookup.lookup("a", None).unwrap().as_deref(), Some("override"));
/// assert_eq!(lookup.lookup("b", None).unwrap().as_deref(), Some("local"));
/// assert_eq!(lookup.lookup("c", Some("default")).unwrap().as_deref(), Some("default"));
/// ```
#[derive(Clone, Copy)]
pub struct PropertiesLookup<'a> {
    local: Option<&'a PropertySet>,
    overrides: &'a PropertySet,
    sources: &'a [Arc<dyn PropertiesSource>],
    initial: &'a PropertySet,
}

impl<'a> PropertiesLookup<'a> {
    /// Creates a lookup over the given layers; `sources` must already be in
    /// precedence order.
    pub fn new(
        overrides: &'a PropertySet,
        sources: &'a [Arc<dyn PropertiesSource>],
        initial: &'a PropertySet,
    ) -> Self {
        Self {
            local: None,
            overrides,
            sources,
            initial,
        }
    }

    /// Adds call-scoped local properties on top.
    pub fn with_local(mut self, local: &'a LocalProperties) -> Self {
        self.local = Some(local.as_set());
        self
    }

    /// Returns the value of `name`, or `default` when no layer has it.
    pub fn lookup(&self, name: &str, default: Option<&str>) -> Result<Option<String>> {
        let hit = match self.find_local(name) {
            Some(hit) => Some(hit),
            None => self.find_shared(name)?,
        };
        Ok(hit
            .map(|hit| hit.value)
            .or_else(|| default.map(str::to_string)))
    }

    fn find_local(&self, name: &str) -> Option<Hit> {
        self.local.and_then(|local| find_in(local, name))
    }

    /// Override, sources and initial layers.
    fn find_shared(&self, name: &str) -> Result<Option<Hit>> {
        if let Some(hit) = find_in(self.overrides, name) {
            return Ok(Some(hit));
        }
        for source in self.sources {
            if let Some(value) = source.get_property(name)? {
                return Ok(Some(Hit::new(value, source.name())));
            }
        }
        Ok(find_in(self.initial, name))
    }
}

impl PlaceholderLookup for PropertiesLookup<'_> {
    fn get_property(&self, key: &str, _default: Option<&str>) -> Result<Option<String>> {
        self.lookup(key, None)
    }
}

/// The full per-key resolution chain used when parsing.
///
/// Order: environment (override), system properties (override), local,
/// override, sources, initial, custom lookup, environment (fallback), system
/// properties (fallback).
pub struct ResolutionChain<'a> {
    lookup: PropertiesLookup<'a>,
    env: Option<(&'a dyn Environment, PropertiesMode)>,
    sys: Option<(&'a SystemProperties, PropertiesMode)>,
    custom: Option<&'a CustomLookup>,
    listeners: &'a [Arc<dyn PropertiesLookupListener>],
    memo: Option<&'a MemoCache>,
    audit: Option<&'a AuditTrail>,
}

impl<'a> ResolutionChain<'a> {
    /// Creates a chain over `lookup` with no environment, system properties or listeners.
    pub fn new(lookup: PropertiesLookup<'a>) -> Self {
        Self {
            lookup,
            env: None,
            sys: None,
            custom: None,
            listeners: &[],
            memo: None,
            audit: None,
        }
    }

    /// Consults `env` according to `mode`.
    pub fn with_environment(mut self, env: &'a dyn Environment, mode: PropertiesMode) -> Self {
        self.env = Some((env, mode));
        self
    }

    /// Consults `sys` according to `mode`.
    pub fn with_system_properties(mut self, sys: &'a SystemProperties, mode: PropertiesMode) -> Self {
        self.sys = Some((sys, mode));
        self
    }

    /// Consults `custom` after every property layer.
    pub fn with_custom_lookup(mut self, custom: Option<&'a CustomLookup>) -> Self {
        self.custom = custom;
        self
    }

    /// Notifies `listeners` of every hit.
    pub fn with_listeners(mut self, listeners: &'a [Arc<dyn PropertiesLookupListener>]) -> Self {
        self.listeners = listeners;
        self
    }

    /// Records every hit in `audit`.
    pub fn with_audit(mut self, audit: &'a AuditTrail) -> Self {
        self.audit = Some(audit);
        self
    }

    pub(crate) fn with_memo(mut self, memo: Option<&'a MemoCache>) -> Self {
        self.memo = memo;
        self
    }

    fn env_in(&self, mode: PropertiesMode, name: &str) -> Option<Hit> {
        match self.env {
            Some((env, m)) if m == mode => env.lookup(name).map(|v| Hit::new(v, ENV_SOURCE)),
            _ => None,
        }
    }

    fn sys_in(&self, mode: PropertiesMode, name: &str) -> Option<Hit> {
        match self.sys {
            Some((sys, m)) if m == mode => sys.get(name).map(|v| Hit::new(v, SYS_SOURCE)),
            _ => None,
        }
    }

    fn resolve(&self, name: &str) -> Result<Option<Hit>> {
        if let Some(hit) = self
            .env_in(PropertiesMode::Override, name)
            .or_else(|| self.sys_in(PropertiesMode::Override, name))
            .or_else(|| self.lookup.find_local(name))
        {
            return Ok(Some(hit));
        }

        if let Some(memo) = self.memo {
            if let Ok(memo) = memo.read() {
                if let Some((value, source)) = memo.get(name) {
                    return Ok(Some(Hit::new(value.as_str(), source.as_str())));
                }
            }
        }

        let hit = self.resolve_shared(name)?;
        if let (Some(memo), Some(hit)) = (self.memo, hit.as_ref()) {
            if let Ok(mut memo) = memo.write() {
                memo.insert(name.to_string(), (hit.value.clone(), hit.source.clone()));
            }
        }
        Ok(hit)
    }

    fn resolve_shared(&self, name: &str) -> Result<Option<Hit>> {
        if let Some(hit) = self.lookup.find_shared(name)? {
            return Ok(Some(hit));
        }
        let custom = self
            .custom
            .and_then(|custom| custom(name))
            .map(|v| Hit::new(v, CUSTOM_SOURCE));
        Ok(custom
            .or_else(|| self.env_in(PropertiesMode::Fallback, name))
            .or_else(|| self.sys_in(PropertiesMode::Fallback, name)))
    }

    fn notify(&self, name: &str, hit: &Hit, default: Option<&str>) {
        tracing::debug!(
            "Found property with key [{}] in source [{}]",
            name,
            hit.source
        );

        for listener in self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                listener.on_lookup(name, &hit.value, default, &hit.source)
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!("Lookup listener failed for key [{}]: {}", name, e);
                }
                Err(_) => {
                    tracing::warn!("Lookup listener panicked for key [{}]", name);
                }
            }
        }

        if let Some(audit) = self.audit {
            audit.record(ResolvedValue::new(
                name,
                hit.value.as_str(),
                default.map(str::to_string),
                hit.source.as_str(),
            ));
        }
    }
}

impl PlaceholderLookup for ResolutionChain<'_> {
    fn get_property(&self, key: &str, default: Option<&str>) -> Result<Option<String>> {
        let hit = self.resolve(key)?;
        if let Some(hit) = &hit {
            self.notify(key, hit, default);
        }
        Ok(hit.map(|hit| hit.value))
    }

    fn on_resolved(&self, key: &str, value: &str) {
        if let Some(audit) = self.audit {
            audit.update_current(key, value);
        }
    }
}
