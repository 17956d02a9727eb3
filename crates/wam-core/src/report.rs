//! Blocked-feature report messages
//!
//! The report page asks the background context which features were blocked
//! in a tab and renders the answer. Messages travel as two-element JSON
//! arrays, `[type, payload]`:
//!
//! ```text
//! ["blockedFeaturesForTab", {"tabId": 12}]
//! ["blockedFeaturesForTabResponse", {"0": {"url": "...", "standardReports": {...}}}]
//! ```
//!
//! This module owns the wire shape and the sorting the page applies before
//! rendering. Layout is left to the page.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::StandardId;

pub const REPORT_REQUEST_TYPE: &str = "blockedFeaturesForTab";
pub const REPORT_RESPONSE_TYPE: &str = "blockedFeaturesForTabResponse";

/// Error type for report message decoding.
#[derive(Debug, thiserror::Error)]
pub enum ReportMessageError {
    #[error("Malformed report message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Payload of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TabReportRequest {
    pub tab_id: u32,
}

/// Features blocked in one frame, grouped by standard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FrameReport {
    pub url: String,
    #[serde(default)]
    pub standard_reports: BTreeMap<StandardId, Vec<String>>,
}

/// One standard's entry in a frame report, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardReport<'a> {
    pub standard_id: &'a str,
    pub features: Vec<&'a str>,
}

impl FrameReport {
    /// True when nothing was blocked in this frame.
    pub fn is_empty(&self) -> bool {
        self.standard_reports.is_empty()
    }

    /// Standards sorted by id, each with its features sorted.
    pub fn sorted_standards(&self) -> Vec<StandardReport<'_>> {
        // BTreeMap keys are already in id order.
        self.standard_reports
            .iter()
            .map(|(standard_id, features)| {
                let mut features: Vec<&str> = features.iter().map(String::as_str).collect();
                features.sort_unstable();
                StandardReport {
                    standard_id: standard_id.as_str(),
                    features,
                }
            })
            .collect()
    }

    pub fn blocked_feature_count(&self) -> usize {
        self.standard_reports.values().map(Vec::len).sum()
    }
}

/// Frame id to that frame's report.
pub type FrameMapping = BTreeMap<String, FrameReport>;

/// A message exchanged between the report page and the background context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMessage {
    BlockedFeaturesForTab(TabReportRequest),
    BlockedFeaturesForTabResponse(FrameMapping),
}

impl ReportMessage {
    pub fn request(tab_id: u32) -> Self {
        Self::BlockedFeaturesForTab(TabReportRequest { tab_id })
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            Self::BlockedFeaturesForTab(_) => REPORT_REQUEST_TYPE,
            Self::BlockedFeaturesForTabResponse(_) => REPORT_RESPONSE_TYPE,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, ReportMessageError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ReportMessageError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ReportMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.message_type())?;
        match self {
            Self::BlockedFeaturesForTab(request) => tuple.serialize_element(request)?,
            Self::BlockedFeaturesForTabResponse(frames) => tuple.serialize_element(frames)?,
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for ReportMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (message_type, payload): (String, serde_json::Value) = Deserialize::deserialize(deserializer)?;
        match message_type.as_str() {
            REPORT_REQUEST_TYPE => serde_json::from_value(payload)
                .map(Self::BlockedFeaturesForTab)
                .map_err(de::Error::custom),
            REPORT_RESPONSE_TYPE => serde_json::from_value(payload)
                .map(Self::BlockedFeaturesForTabResponse)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(UnknownMessageType(other))),
        }
    }
}

struct UnknownMessageType<'a>(&'a str);

impl fmt::Display for UnknownMessageType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown message type '{}'", self.0)
    }
}

/// Parse the report page query string. Only `tabId=<digits>` is accepted.
pub fn parse_tab_id_query(query: &str) -> Option<u32> {
    let digits = query.strip_prefix("tabId=")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
