//! Rule-set equivalence
//!
//! Two rule sets are equivalent when they would block the same standards on
//! the same domain patterns. Neither the order of the patterns nor the order
//! of standards within a pattern matters. Both checks are pure: inputs are
//! compared through sorted copies and never reordered.

use crate::types::{RuleSet, StandardList};

/// Returns true if the two lists hold the same standards, ignoring order.
pub fn standard_lists_equivalent(first: &StandardList, second: &StandardList) -> bool {
    first.same_members(second)
}

/// Returns true if both rule sets describe the same blocking policy.
///
/// The pattern sets must match exactly: a pattern mapped to an empty list is
/// not the same as a missing pattern.
pub fn rule_sets_equivalent(first: &RuleSet, second: &RuleSet) -> bool {
    if first.len() != second.len() {
        return false;
    }

    // Same patterns first, then the standards blocked on each.
    if !first.keys().all(|pattern| second.contains_key(pattern)) {
        return false;
    }

    first.iter().all(|(pattern, standards)| match second.get(pattern) {
        Some(other) => standard_lists_equivalent(standards, other),
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(entries: &[(&str, &[&str])]) -> RuleSet {
        entries
            .iter()
            .map(|(pattern, ids)| (pattern.to_string(), StandardList::from(*ids)))
            .collect()
    }

    #[test]
    fn test_reflexive() {
        let set = rules(&[("a.com", &["X", "Y"]), ("(default)", &[])]);
        assert!(rule_sets_equivalent(&set, &set));
    }

    #[test]
    fn test_symmetric() {
        let a = rules(&[("a.com", &["X"])]);
        let b = rules(&[("a.com", &["Y"])]);
        assert_eq!(rule_sets_equivalent(&a, &b), rule_sets_equivalent(&b, &a));
        assert!(!rule_sets_equivalent(&a, &b));
    }

    #[test]
    fn test_ignores_standard_order() {
        let a = rules(&[("a.com", &["X", "Y", "Z"]), ("b.com", &["Q"])]);
        let b = rules(&[("b.com", &["Q"]), ("a.com", &["Z", "X", "Y"])]);
        assert!(rule_sets_equivalent(&a, &b));
        assert!(rule_sets_equivalent(&b, &a));
    }

    #[test]
    fn test_inputs_not_reordered() {
        let a = rules(&[("a.com", &["Z", "X"])]);
        let b = rules(&[("a.com", &["X", "Z"])]);
        assert!(rule_sets_equivalent(&a, &b));
        assert_eq!(a["a.com"].as_slice(), &["Z".to_string(), "X".to_string()]);
    }

    #[test]
    fn test_empty_sets() {
        let empty = RuleSet::new();
        assert!(rule_sets_equivalent(&empty, &RuleSet::new()));
        assert!(!rule_sets_equivalent(&empty, &rules(&[("a.com", &[])])));
    }

    #[test]
    fn test_empty_rule_differs_from_missing_rule() {
        let with_empty = rules(&[("a.com", &["X"]), ("b.com", &[])]);
        let without = rules(&[("a.com", &["X"])]);
        assert!(!rule_sets_equivalent(&with_empty, &without));
        assert!(!rule_sets_equivalent(&without, &with_empty));
    }

    #[test]
    fn test_different_patterns_same_size() {
        let a = rules(&[("a.com", &["X"])]);
        let b = rules(&[("b.com", &["X"])]);
        assert!(!rule_sets_equivalent(&a, &b));
    }

    #[test]
    fn test_duplicate_standards_count() {
        let a = StandardList::from(&["X", "X"][..]);
        let b = StandardList::from(&["X"][..]);
        assert!(!standard_lists_equivalent(&a, &b));
    }
}
