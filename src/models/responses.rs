//! Response DTOs for the store API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::CompactionReport;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the SET operation (POST /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Always "success"
    pub status: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            key: key.into(),
        }
    }
}

/// Response body for the DELETE operation (DELETE /delete/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Always "deleted"
    pub status: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            status: "deleted".to_string(),
            key: key.into(),
        }
    }
}

/// Response body for the compaction endpoint (POST /compact)
#[derive(Debug, Clone, Serialize)]
pub struct CompactResponse {
    /// "compacted", or "skipped" when there was no log to rewrite
    pub status: String,
    pub old_size: Option<usize>,
    pub new_size: Option<usize>,
    pub expired: Option<usize>,
}

impl CompactResponse {
    pub fn from_report(report: Option<CompactionReport>) -> Self {
        match report {
            Some(report) => Self {
                status: "compacted".to_string(),
                old_size: Some(report.old_size),
                new_size: Some(report.new_size),
                expired: Some(report.expired),
            },
            None => Self {
                status: "skipped".to_string(),
                old_size: None,
                new_size: None,
                expired: None,
            },
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}
