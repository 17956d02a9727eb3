//! Rule import
//!
//! Import is validate-then-commit: the whole text is parsed before any rule
//! is touched, so malformed input never leaves a partial merge behind.
//! Records are then merged one at a time, in input order, each producing one
//! log line.

use std::fmt;

use log::{debug, warn};
use serde::Serialize;
use ts_rs::TS;

use wam_core::store::RuleStore;
use wam_core::types::DomainPattern;

use crate::record::RuleRecord;

/// Error type for import text that cannot be applied.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No data to import.")]
    NoData,
    #[error("Invalid import data provided.")]
    Invalid(#[source] serde_json::Error),
}

/// Parse import text into rule records.
///
/// Blank text is [`ImportError::NoData`]; anything that is not a JSON array
/// of rule records is [`ImportError::Invalid`].
pub fn parse_import(text: &str) -> Result<Vec<RuleRecord>, ImportError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ImportError::NoData);
    }

    serde_json::from_str(trimmed).map_err(ImportError::Invalid)
}

/// Outcome of merging one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLogEntry {
    /// A rule for the pattern existed and overwriting was off.
    Skipped { pattern: DomainPattern },
    /// The record's standards were written for the pattern.
    Applied { pattern: DomainPattern, count: usize },
}

impl fmt::Display for ImportLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { pattern } => write!(f, " ! {}: Skipped. Set to not override.", pattern),
            Self::Applied { pattern, count } => write!(f, " * {}: Blocking {} standards.", pattern, count),
        }
    }
}

/// Per-record results of one import, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub entries: Vec<ImportLogEntry>,
}

impl ImportReport {
    pub fn applied(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, ImportLogEntry::Applied { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.len() - self.applied()
    }

    /// One line per record.
    pub fn log(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Merge parsed records into the store.
///
/// An existing pattern is only replaced when `overwrite` is set.
pub fn merge_import(store: &mut RuleStore, records: Vec<RuleRecord>, overwrite: bool) -> ImportReport {
    let mut report = ImportReport::default();

    for RuleRecord { pattern, standard_ids } in records {
        if store.contains_domain(&pattern) && !overwrite {
            debug!("Import skipped existing rule for '{}'", pattern);
            report.entries.push(ImportLogEntry::Skipped { pattern });
            continue;
        }

        let count = standard_ids.len();
        store.set_standards_for_domain(&pattern, standard_ids);
        report.entries.push(ImportLogEntry::Applied { pattern, count });
    }

    debug!(
        "Imported {} rules ({} skipped)",
        report.applied(),
        report.skipped()
    );
    report
}

/// What the options page shows after an import attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ImportStatus {
    pub import_error: bool,
    pub import_log: String,
}

/// Parse `text` and merge it into the store.
///
/// Never fails: parse errors are reported through the returned status and
/// leave the store untouched.
pub fn import_text(store: &mut RuleStore, text: &str, overwrite: bool) -> ImportStatus {
    match parse_import(text) {
        Ok(records) => {
            let report = merge_import(store, records, overwrite);
            ImportStatus {
                import_error: false,
                import_log: report.log(),
            }
        }
        Err(err) => {
            warn!("Rejected import: {}", err);
            ImportStatus {
                import_error: true,
                import_log: err.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wam_core::types::{RuleSet, StandardList, DEFAULT_DOMAIN_RULE};

    fn store_with(entries: &[(&str, &[&str])]) -> RuleStore {
        let rules: RuleSet = entries
            .iter()
            .map(|(pattern, ids)| (pattern.to_string(), StandardList::from(*ids)))
            .collect();
        let mut store = RuleStore::new(DEFAULT_DOMAIN_RULE);
        store.replace_rule_set(rules);
        store
    }

    const CONSOLE_IMPORT: &str = r#"[{"pattern":"a.com","standardIds":["Console API"]}]"#;

    #[test]
    fn test_parse_import() {
        let records = parse_import(
            r#"  [{"pattern":"a.com","standardIds":["X","Y"]},{"pattern":"b.com","standardIds":[]}]  "#,
        )
        .expect("import should parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pattern, "a.com");
        assert_eq!(records[0].standard_ids.len(), 2);
        assert!(records[1].standard_ids.is_empty());
    }

    #[test]
    fn test_parse_blank_is_no_data() {
        assert!(matches!(parse_import(""), Err(ImportError::NoData)));
        assert!(matches!(parse_import("  \n\t"), Err(ImportError::NoData)));
    }

    #[test]
    fn test_parse_malformed_is_invalid() {
        assert!(matches!(parse_import("[{"), Err(ImportError::Invalid(_))));
        assert!(matches!(parse_import(r#"{"pattern":"a.com"}"#), Err(ImportError::Invalid(_))));
        assert!(matches!(parse_import(r#"[{"pattern":"a.com"}]"#), Err(ImportError::Invalid(_))));
    }

    #[test]
    fn test_existing_pattern_skipped_without_overwrite() {
        let mut store = store_with(&[("a.com", &["Other API"])]);

        let status = import_text(&mut store, CONSOLE_IMPORT, false);

        assert!(!status.import_error);
        assert_eq!(status.import_log, " ! a.com: Skipped. Set to not override.");
        assert_eq!(
            store.standards_for_domain("a.com"),
            Some(&StandardList::from(&["Other API"][..]))
        );
    }

    #[test]
    fn test_existing_pattern_replaced_with_overwrite() {
        let mut store = store_with(&[("a.com", &["Other API"])]);

        let status = import_text(&mut store, CONSOLE_IMPORT, true);

        assert!(!status.import_error);
        assert_eq!(status.import_log, " * a.com: Blocking 1 standards.");
        assert_eq!(
            store.standards_for_domain("a.com"),
            Some(&StandardList::from(&["Console API"][..]))
        );
    }

    #[test]
    fn test_log_follows_input_order() {
        let mut store = store_with(&[("b.com", &[])]);
        let text = r#"[
            {"pattern":"c.com","standardIds":["X","Y"]},
            {"pattern":"b.com","standardIds":["X"]},
            {"pattern":"a.com","standardIds":[]}
        ]"#;

        let records = parse_import(text).expect("import should parse");
        let report = merge_import(&mut store, records, false);

        assert_eq!(report.applied(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(
            report.log(),
            " * c.com: Blocking 2 standards.\n ! b.com: Skipped. Set to not override.\n * a.com: Blocking 0 standards."
        );
        assert!(store.contains_domain("a.com"));
        assert!(store.contains_domain("c.com"));
    }

    #[test]
    fn test_malformed_import_leaves_store_untouched() {
        let mut store = store_with(&[("a.com", &["X"])]);
        let revision = store.revision();

        let status = import_text(&mut store, "[{\"pattern\":", true);

        assert!(status.import_error);
        assert_eq!(status.import_log, "Invalid import data provided.");
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_blank_import_reports_no_data() {
        let mut store = store_with(&[]);
        let status = import_text(&mut store, "   ", false);
        assert!(status.import_error);
        assert_eq!(status.import_log, "No data to import.");
        assert!(store.domain_names().is_empty());
    }

    #[test]
    fn test_import_into_selected_domain_updates_view() {
        let mut store = store_with(&[(DEFAULT_DOMAIN_RULE, &[])]);
        let text = r#"[{"pattern":"(default)","standardIds":["Beacon"]}]"#;

        import_text(&mut store, text, true);

        assert_eq!(
            store.selected_standard_ids(),
            Some(&StandardList::from(&["Beacon"][..]))
        );
    }
}
