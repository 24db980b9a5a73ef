// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Persisted session status.

use serde::{Deserialize, Serialize};

/// When the status was saved. New files carry an RFC 3339 string; numeric
/// epoch seconds are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedAt {
    Epoch(f64),
    Text(String),
}

impl std::fmt::Display for SavedAt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SavedAt::Epoch(secs) => match chrono::DateTime::from_timestamp(*secs as i64, 0) {
                Some(t) => write!(f, "{}", t.to_rfc3339()),
                None => write!(f, "{}", secs),
            },
            SavedAt::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The only state carried between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub time: SavedAt,
    pub page: usize,
}

impl SessionStatus {
    /// Status for `page`, stamped now.
    pub fn now(page: usize) -> Self {
        Self {
            time: SavedAt::Text(chrono::Utc::now().to_rfc3339()),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_epoch_and_text_timestamps() {
        let old: SessionStatus = serde_json::from_str(r#"{"time": 1700000000.5, "page": 4}"#).unwrap();
        assert_eq!(old.page, 4);
        assert!(matches!(old.time, SavedAt::Epoch(_)));
        assert!(old.time.to_string().starts_with("2023-11-14"));

        let new: SessionStatus =
            serde_json::from_str(r#"{"time": "2025-01-02T03:04:05+00:00", "page": 0}"#).unwrap();
        assert_eq!(new.time, SavedAt::Text("2025-01-02T03:04:05+00:00".to_string()));
    }

    #[test]
    fn test_negative_page_is_rejected() {
        assert!(serde_json::from_str::<SessionStatus>(r#"{"time": 0, "page": -1}"#).is_err());
    }
}
