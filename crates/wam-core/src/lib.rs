//! WebAPI Manager Core Library
//!
//! This crate holds the domain-rule state model for the WebAPI Manager
//! extension: which web-platform standards are blocked on which domains.
//!
//! # Architecture
//!
//! A [`RuleStore`] owns the policy for one editing session and exposes a
//! closed set of mutations. Derived fields (domain names, the selected
//! domain's standards) are recomputed inside every mutation. Persistence and
//! broadcasting are left to the caller, which watches the store's revision.
//!
//! # Modules
//!
//! - `types`: Rule set, standard list and persisted layout
//! - `equivalence`: Order-independent rule set comparison
//! - `store`: The rule state store
//! - `report`: Blocked-feature report messages

pub mod equivalence;
pub mod report;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use equivalence::{rule_sets_equivalent, standard_lists_equivalent};
pub use report::{FrameMapping, FrameReport, ReportMessage, ReportMessageError, TabReportRequest};
pub use store::{RuleStore, RuleStoreError};
pub use types::{DomainPattern, PersistedState, RuleSet, StandardId, StandardList, DEFAULT_DOMAIN_RULE};
