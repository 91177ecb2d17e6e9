use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published release, normalized to the instant it went out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEvent {
    pub tag: String,
    pub timestamp: DateTime<Utc>,
}

/// A merged pull request, normalized to the instant it was merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedPull {
    pub number: u64,
    pub title: String,
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
}
