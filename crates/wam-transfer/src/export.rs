//! Rule export
//!
//! Domains are written in the order the user picked them; standards within
//! each domain are sorted. The store's own lists are never reordered.

use log::warn;

use wam_core::types::{RuleSet, StandardList};

use crate::record::RuleRecord;

/// Error type for export serialization.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Records for `domains`, in the given order.
///
/// Domains without a rule are skipped.
pub fn export_records<S: AsRef<str>>(domains: &[S], rules: &RuleSet) -> Vec<RuleRecord> {
    domains
        .iter()
        .filter_map(|domain| {
            let domain = domain.as_ref();
            match rules.get(domain) {
                Some(standards) => Some(RuleRecord::new(domain, StandardList::from(standards.sorted()))),
                None => {
                    warn!("No rule for '{}', left out of export", domain);
                    None
                }
            }
        })
        .collect()
}

/// Export text for `domains`.
pub fn export_string<S: AsRef<str>>(domains: &[S], rules: &RuleSet) -> Result<String, ExportError> {
    Ok(serde_json::to_string(&export_records(domains, rules))?)
}
