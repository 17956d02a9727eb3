//! Core type definitions for the rule state model
//!
//! These types map directly to the persisted storage layout and the
//! import/export text format, and are used throughout the store.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Reserved pattern for the fallback rule applied when no domain-specific
/// rule matches a page.
pub const DEFAULT_DOMAIN_RULE: &str = "(default)";

/// A domain matching pattern: an exact host, a wildcard such as
/// `*.example.com`, or [`DEFAULT_DOMAIN_RULE`].
pub type DomainPattern = String;

/// Opaque identifier of a blockable standard, e.g. `"Console API"`.
pub type StandardId = String;

// =============================================================================
// Standard Lists
// =============================================================================

/// Standards blocked for one domain.
///
/// Semantically a set, stored as a sequence in the order the caller gave it.
/// Duplicates are kept as supplied; comparison ignores order, and a sorted
/// copy is produced at the display/export boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StandardList(Vec<StandardId>);

impl StandardList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, standard_id: &str) -> bool {
        self.0.iter().any(|id| id == standard_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StandardId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[StandardId] {
        &self.0
    }

    /// Sorted copy, for display and export. Never reorders `self`.
    pub fn sorted(&self) -> Vec<StandardId> {
        let mut ids = self.0.clone();
        ids.sort();
        ids
    }

    /// True if both lists hold the same values with the same multiplicity,
    /// regardless of order.
    pub fn same_members(&self, other: &StandardList) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.sorted() == other.sorted()
    }

    pub fn into_vec(self) -> Vec<StandardId> {
        self.0
    }
}

impl From<Vec<StandardId>> for StandardList {
    fn from(ids: Vec<StandardId>) -> Self {
        Self(ids)
    }
}

impl From<&[&str]> for StandardList {
    fn from(ids: &[&str]) -> Self {
        Self(ids.iter().map(|id| id.to_string()).collect())
    }
}

impl FromIterator<StandardId> for StandardList {
    fn from_iter<I: IntoIterator<Item = StandardId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a StandardList {
    type Item = &'a StandardId;
    type IntoIter = std::slice::Iter<'a, StandardId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Rule Sets
// =============================================================================

/// Full blocking policy: domain pattern to the standards blocked on it.
///
/// Serialized as a JSON object keyed by pattern. Key order carries no
/// meaning; the map keeps keys sorted so iteration is deterministic.
pub type RuleSet = BTreeMap<DomainPattern, StandardList>;

// =============================================================================
// Persisted State
// =============================================================================

/// Snapshot written to extension storage.
///
/// Only the policy and the logging flag are persisted. Selection and derived
/// lists are session state and are rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PersistedState {
    #[serde(default)]
    pub domain_rules: RuleSet,
    #[serde(default)]
    pub should_log: bool,
}

impl PersistedState {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
