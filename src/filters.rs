//! Task list filters.
//!
//! The filter set has exactly four free-form text fields. Values are never
//! validated; empty fields are simply left out of the request.

use std::str::FromStr;
use tokio::sync::watch;

/// One of the four filter keys, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Status,
    Priority,
    Assignee,
    Search,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Status,
        FilterField::Priority,
        FilterField::Assignee,
        FilterField::Search,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Status => "status",
            FilterField::Priority => "priority",
            FilterField::Assignee => "assignee",
            FilterField::Search => "search",
        }
    }
}

impl std::fmt::Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown filter field '{0}' (expected status, priority, assignee or search)")]
pub struct UnknownFilterField(pub String);

impl FromStr for FilterField {
    type Err = UnknownFilterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownFilterField(s.to_string()))
    }
}

/// Current filter values. All empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    pub status: String,
    pub priority: String,
    pub assignee: String,
    pub search: String,
}

impl FilterSet {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Status => &self.status,
            FilterField::Priority => &self.priority,
            FilterField::Assignee => &self.assignee,
            FilterField::Search => &self.search,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut String {
        match field {
            FilterField::Status => &mut self.status,
            FilterField::Priority => &mut self.priority,
            FilterField::Assignee => &mut self.assignee,
            FilterField::Search => &mut self.search,
        }
    }

    /// Replace one field. Returns whether the value changed.
    pub fn set_field(&mut self, field: FilterField, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = self.slot_mut(field);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    /// Clear every field. Returns whether anything changed.
    pub fn reset_all(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        *self = FilterSet::default();
        true
    }

    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// Request parameters: the non-empty fields only, in fixed key order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        FilterField::ALL
            .iter()
            .filter(|f| !self.get(**f).is_empty())
            .map(|f| (f.as_str(), self.get(*f).to_string()))
            .collect()
    }
}

/// Holder for the dashboard's filter set.
///
/// Observers are notified through a watch channel, and only when the value
/// actually changes.
#[derive(Debug)]
pub struct FilterState {
    tx: watch::Sender<FilterSet>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(FilterSet::default());
        Self { tx }
    }

    /// Snapshot of the current filters.
    pub fn current(&self) -> FilterSet {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilterSet> {
        self.tx.subscribe()
    }

    pub fn set_field(&self, field: FilterField, value: impl Into<String>) -> bool {
        let value = value.into();
        let changed = self.tx.send_if_modified(|filters| filters.set_field(field, value));
        if changed {
            tracing::debug!("Filter '{}' updated", field);
        }
        changed
    }

    pub fn reset_all(&self) -> bool {
        let changed = self.tx.send_if_modified(FilterSet::reset_all);
        if changed {
            tracing::debug!("Filters reset");
        }
        changed
    }
}
