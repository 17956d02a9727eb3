//! Rule State Store
//!
//! Single source of truth for the blocking policy during an editing session.
//! The store owns the rule set, the editor's selected domain and the logging
//! flag. Two derived fields are kept in lock-step by every mutation:
//!
//! - `domain_names` is always exactly the key set of `domain_rules`
//! - `selected_standard_ids` is always `domain_rules[selected_domain]`
//!   (absent when the selection has no rule)
//!
//! Nothing here performs I/O. Callers watch [`RuleStore::revision`] (or the
//! return value of [`RuleStore::replace_rule_set`]) to decide when to persist
//! or broadcast. The revision only moves when a persisted field (the rules or
//! the logging flag) changes; selecting a domain never moves it.

use log::debug;

use crate::equivalence::rule_sets_equivalent;
use crate::types::{DomainPattern, PersistedState, RuleSet, StandardList, DEFAULT_DOMAIN_RULE};

/// Error type for store mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleStoreError {
    #[error("A rule for '{0}' already exists")]
    DomainExists(DomainPattern),
}

/// Editing-session state for the domain blocking policy.
#[derive(Debug, Clone)]
pub struct RuleStore {
    selected_domain: DomainPattern,
    domain_rules: RuleSet,
    domain_names: Vec<DomainPattern>,
    should_log: bool,
    selected_standard_ids: Option<StandardList>,
    revision: u64,
}

impl RuleStore {
    /// Fresh store with no rules, `initial_domain` selected and logging off.
    pub fn new(initial_domain: &str) -> Self {
        Self {
            selected_domain: initial_domain.to_string(),
            domain_rules: RuleSet::new(),
            domain_names: Vec::new(),
            should_log: false,
            selected_standard_ids: Some(StandardList::new()),
            revision: 0,
        }
    }

    /// Build a store from a persisted snapshot.
    pub fn from_persisted(initial_domain: &str, snapshot: PersistedState) -> Self {
        let mut store = Self::new(initial_domain);
        store.load_persisted(snapshot);
        store
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn selected_domain(&self) -> &str {
        &self.selected_domain
    }

    pub fn domain_rules(&self) -> &RuleSet {
        &self.domain_rules
    }

    pub fn domain_names(&self) -> &[DomainPattern] {
        &self.domain_names
    }

    pub fn should_log(&self) -> bool {
        self.should_log
    }

    /// Standards of the selected domain. `None` when the selection has no
    /// rule yet, which consumers render as an empty list.
    pub fn selected_standard_ids(&self) -> Option<&StandardList> {
        self.selected_standard_ids.as_ref()
    }

    pub fn standards_for_domain(&self, domain: &str) -> Option<&StandardList> {
        self.domain_rules.get(domain)
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        self.domain_rules.contains_key(domain)
    }

    /// Incremented whenever the persisted state (rules or logging flag)
    /// changes. Selection changes leave it alone.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Apply a persisted snapshot (rule set, then logging flag).
    pub fn load_persisted(&mut self, snapshot: PersistedState) {
        let PersistedState {
            domain_rules,
            should_log,
        } = snapshot;
        self.replace_rule_set(domain_rules);
        self.set_should_log(should_log);
    }

    /// Replace the whole rule set.
    ///
    /// Returns false, touching nothing, when `new_rules` is equivalent to the
    /// current rules, so observers are not triggered by identical updates.
    /// When the selected domain is missing from the new rules, the view falls
    /// back to the default rule.
    pub fn replace_rule_set(&mut self, new_rules: RuleSet) -> bool {
        if rule_sets_equivalent(&new_rules, &self.domain_rules) {
            debug!("Ignoring rule set identical to current rules");
            return false;
        }

        self.domain_rules = new_rules;
        self.refresh_domain_names();

        let view = self
            .domain_rules
            .get(&self.selected_domain)
            .or_else(|| self.domain_rules.get(DEFAULT_DOMAIN_RULE))
            .cloned();
        self.selected_standard_ids = view;
        self.bump();

        debug!("Replaced rule set ({} domains)", self.domain_names.len());
        true
    }

    /// Select `domain` for editing. Not guarded: selecting an unknown domain
    /// leaves the view empty until a rule is added for it.
    pub fn select_domain(&mut self, domain: &str) {
        self.selected_domain = domain.to_string();
        self.selected_standard_ids = self.domain_rules.get(domain).cloned();
    }

    /// Set the standards blocked on the selected domain.
    pub fn set_selected_standards(&mut self, standard_ids: StandardList) {
        let previous = self
            .domain_rules
            .insert(self.selected_domain.clone(), standard_ids.clone());
        let changed = previous.as_ref() != Some(&standard_ids);
        self.selected_standard_ids = Some(standard_ids);
        self.refresh_domain_names();
        if changed {
            self.bump();
        }
    }

    /// Remove the rule for `domain`. Deleting the selected domain first moves
    /// the selection to the default rule.
    pub fn delete_domain(&mut self, domain: &str) {
        if self.selected_domain == domain {
            self.select_domain(DEFAULT_DOMAIN_RULE);
        }

        if self.domain_rules.remove(domain).is_some() {
            debug!("Deleted rule for '{}'", domain);
            self.refresh_domain_names();
            self.bump();
        }
    }

    /// Add an empty rule for `domain` and select it.
    ///
    /// Fails without touching the store if a rule for `domain` exists; use
    /// [`RuleStore::set_standards_for_domain`] to reset a rule.
    pub fn add_domain(&mut self, domain: &str) -> Result<(), RuleStoreError> {
        if self.domain_rules.contains_key(domain) {
            return Err(RuleStoreError::DomainExists(domain.to_string()));
        }

        self.domain_rules.insert(domain.to_string(), StandardList::new());
        self.refresh_domain_names();
        self.selected_domain = domain.to_string();
        self.selected_standard_ids = Some(StandardList::new());
        self.bump();

        debug!("Added rule for '{}'", domain);
        Ok(())
    }

    /// Set the standards blocked on `domain`, creating the rule if needed.
    pub fn set_standards_for_domain(&mut self, domain: &str, standard_ids: StandardList) {
        if domain == self.selected_domain {
            self.selected_standard_ids = Some(standard_ids.clone());
        }
        let previous = self.domain_rules.insert(domain.to_string(), standard_ids);
        let changed = previous.as_ref() != self.domain_rules.get(domain);
        self.refresh_domain_names();
        if changed {
            self.bump();
        }
    }

    pub fn set_should_log(&mut self, should_log: bool) {
        if self.should_log != should_log {
            self.should_log = should_log;
            self.bump();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sorted patterns whose rule blocks nothing.
    pub fn domains_with_no_blocked_standards(&self) -> Vec<DomainPattern> {
        self.domains_where(|standards| standards.is_empty())
    }

    /// Sorted patterns whose rule blocks at least one standard.
    pub fn domains_with_blocked_standards(&self) -> Vec<DomainPattern> {
        self.domains_where(|standards| !standards.is_empty())
    }

    /// Snapshot for storage. Selection and derived lists are never persisted.
    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            domain_rules: self.domain_rules.clone(),
            should_log: self.should_log,
        }
    }

    fn domains_where<F>(&self, predicate: F) -> Vec<DomainPattern>
    where
        F: Fn(&StandardList) -> bool,
    {
        let mut domains: Vec<DomainPattern> = self
            .domain_names
            .iter()
            .filter(|domain| self.domain_rules.get(*domain).map_or(false, &predicate))
            .cloned()
            .collect();
        domains.sort();
        domains
    }

    fn refresh_domain_names(&mut self) {
        self.domain_names = self.domain_rules.keys().cloned().collect();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
