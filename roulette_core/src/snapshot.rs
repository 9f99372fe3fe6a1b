//! Serializable form of the History Store.
//!
//! The JSON shape matches the layout browsers kept in local storage:
//!
//! ```text
//! {
//!   "alice@x": {
//!     "pairKeys": ["alice@x\u001fbob@x"],
//!     "hasPairedWith": {
//!       "bob@x": [{ "date": "2024-01-01T09:00:00Z", "round": 1 }]
//!     }
//!   }
//! }
//! ```

use crate::error::RouletteResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contact as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSnapshot {
    /// When the round was recorded (RFC 3339)
    pub date: DateTime<Utc>,

    /// Round number
    pub round: u32,
}

/// One participant as stored in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSnapshot {
    #[serde(default)]
    pub pair_keys: Vec<String>,

    #[serde(default)]
    pub has_paired_with: BTreeMap<String, Vec<ContactSnapshot>>,
}

/// Complete history snapshot, keyed by participant id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistorySnapshot {
    pub participants: BTreeMap<String, ParticipantSnapshot>,
}

impl HistorySnapshot {
    /// True when the snapshot holds no participants.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Encodes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> RouletteResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(json: &str) -> RouletteResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_browser_layout() {
        let json = r#"{
            "a@x": {
                "pairKeys": ["a@x-b@x"],
                "hasPairedWith": {
                    "b@x": [{ "date": "2024-03-04T10:15:00.000Z", "round": 2 }]
                }
            },
            "b@x": { "hasPairedWith": {} }
        }"#;

        let snapshot = HistorySnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.participants.len(), 2);

        let a = &snapshot.participants["a@x"];
        assert_eq!(a.pair_keys, vec!["a@x-b@x".to_string()]);
        assert_eq!(a.has_paired_with["b@x"][0].round, 2);
        assert!(snapshot.participants["b@x"].pair_keys.is_empty());
    }

    #[test]
    fn test_writes_camel_case_fields() {
        let mut snapshot = HistorySnapshot::default();
        snapshot
            .participants
            .insert("a@x".to_string(), ParticipantSnapshot::default());

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"pairKeys\""));
        assert!(json.contains("\"hasPairedWith\""));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(HistorySnapshot::from_json("{ not json").is_err());
        assert!(HistorySnapshot::from_json(r#"{"a": {"hasPairedWith": {"b": [{"round": 1}]}}}"#).is_err());
    }
}
