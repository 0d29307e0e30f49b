use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device-local watch position for one catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Resume fraction in [0,1]
    pub value: f64,
    /// Absolute position in seconds
    pub position: f64,
    /// Total duration in seconds
    pub duration: f64,
    /// Epoch milliseconds of the last save
    pub updated_at: i64,
}

/// Identifier to record mapping persisted as one JSON document
pub type ProgressMap = HashMap<String, ProgressRecord>;

/// The thing a progress record points at. A record references either a
/// standalone title (movie) or a single episode, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    Title(i64),
    Episode(i64),
}

impl WatchTarget {
    pub fn id(&self) -> i64 {
        match self {
            WatchTarget::Title(id) => *id,
            WatchTarget::Episode(id) => *id,
        }
    }
}

/// Server-side progress record, carried forward so later saves update the
/// same record instead of creating a new one
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProgress {
    pub id: i64,
    pub progress_seconds: f64,
    pub duration_seconds: f64,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_watched_at: Option<DateTime<Utc>>,
}

/// Row of the continue-watching rail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueEntry {
    /// Identifier of the underlying progress record
    pub id: i64,
    /// Episode id when the record links an episode, title id otherwise
    pub watch_id: i64,
    pub title_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Whole percent in 0..=100
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<String>,
}

/// Parameters for creating or updating a server-side progress record
#[derive(Debug, Clone, Copy)]
pub struct SaveProgressRequest {
    /// Existing record id, if one was fetched earlier
    pub progress_id: Option<i64>,
    pub target: WatchTarget,
    pub progress_seconds: f64,
    pub duration_seconds: f64,
    pub completed: bool,
}
