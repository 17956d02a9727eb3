use serde::{Deserialize, Serialize};
use ts_rs::TS;

use wam_core::types::{DomainPattern, StandardList};

/// One domain's rule in import/export text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RuleRecord {
    pub pattern: DomainPattern,
    pub standard_ids: StandardList,
}

impl RuleRecord {
    pub fn new(pattern: impl Into<DomainPattern>, standard_ids: StandardList) -> Self {
        Self {
            pattern: pattern.into(),
            standard_ids,
        }
    }
}
