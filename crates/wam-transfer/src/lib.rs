//! WebAPI Manager Rule Transfer
//!
//! This crate converts between the rule store and the bulk text format users
//! copy in and out of the options page: a JSON array of
//! `{"pattern": ..., "standardIds": [...]}` records.

pub mod export;
pub mod import;
pub mod record;

pub use export::{export_records, export_string, ExportError};
pub use import::{import_text, merge_import, parse_import, ImportError, ImportLogEntry, ImportReport, ImportStatus};
pub use record::RuleRecord;
