// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit records of resolved properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Default number of records kept by an [`AuditTrail`].
pub const DEFAULT_AUDIT_CAPACITY: usize = 1000;

/// A property that was successfully looked up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedValue {
    /// The property key.
    pub name: String,
    /// The raw value as returned by the source.
    pub original_value: String,
    /// The value after nested placeholders were resolved.
    pub current_value: String,
    /// The get-or-else default in effect for the lookup, if any.
    pub default_value: Option<String>,
    /// Label of the source that produced the value.
    pub source: String,
}

impl ResolvedValue {
    /// Creates a record whose current value equals the original value.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        default_value: Option<String>,
        source: impl Into<String>,
    ) -> Self {
        let value = value.into();
        Self {
            name: name.into(),
            original_value: value.clone(),
            current_value: value,
            default_value,
            source: source.into(),
        }
    }
}

/// A bounded, least-recently-written cache of [`ResolvedValue`] records.
///
/// Recording a key that is already present moves it to the most recent
/// position. When the capacity is exceeded, the oldest record is evicted.
///
/// # Examples
///
/// ```
/// use hexprops::domain::{AuditTrail, ResolvedValue};
///
/// let trail = AuditTrail::new(2);
/// trail.record(ResolvedValue::new("a", "1", None, "initial"));
/// trail.record(ResolvedValue::new("b", "2", None, "initial"));
/// trail.record(ResolvedValue::new("c", "3", None, "initial"));
/// assert_eq!(trail.len(), 2);
/// assert!(trail.get("a").is_none());
/// ```
#[derive(Debug)]
pub struct AuditTrail {
    capacity: usize,
    records: RwLock<IndexMap<String, ResolvedValue>>,
}

impl AuditTrail {
    /// Creates a trail holding at most `capacity` records (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: RwLock::new(IndexMap::new()),
        }
    }

    /// Returns the capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a lookup, evicting the oldest record if full.
    pub fn record(&self, value: ResolvedValue) {
        if let Ok(mut records) = self.records.write() {
            records.shift_remove(&value.name);
            records.insert(value.name.clone(), value);
            while records.len() > self.capacity {
                records.shift_remove_index(0);
            }
        }
    }

    /// Updates the resolved (post-nesting) value of an existing record.
    pub fn update_current(&self, name: &str, current_value: &str) {
        if let Ok(mut records) = self.records.write() {
            if let Some(record) = records.get_mut(name) {
                record.current_value = current_value.to_string();
            }
        }
    }

    /// Returns a copy of the record for `name`.
    pub fn get(&self, name: &str) -> Option<ResolvedValue> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(name).cloned())
    }

    /// Returns all records, oldest first.
    pub fn snapshot(&self) -> Vec<ResolvedValue> {
        self.records
            .read()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every record.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
