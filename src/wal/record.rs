//! Log Record Module
//!
//! One WAL record per line, encoded as a self-describing JSON object:
//!
//! ```text
//! {"timestamp":1718000000.25,"action":"SET","key":"a","value":"1","ttl":60}
//! {"timestamp":1718000001.5,"action":"DEL","key":"a"}
//! ```
//!
//! `ttl` is seconds counted from `timestamp`, not an absolute deadline.

use serde::{Deserialize, Serialize};

use crate::cache::current_timestamp_secs;
use crate::error::{Result, StoreError};

// == Wire Format ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogAction {
    Set,
    Del,
}

#[derive(Serialize)]
struct WireRecordRef<'a> {
    timestamp: f64,
    action: LogAction,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u64>,
}

#[derive(Deserialize)]
struct WireRecord {
    timestamp: f64,
    action: LogAction,
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    ttl: Option<u64>,
}

// == Log Record ==
/// Mutation carried by a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOp {
    /// Upsert; `ttl` in seconds from the record's timestamp
    Set { value: String, ttl: Option<u64> },
    /// Removal; carries no value
    Del,
}

/// A single decoded WAL record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// Write time, Unix seconds
    pub timestamp: f64,
    pub key: String,
    pub op: LogOp,
}

impl LogRecord {
    /// A SET record stamped with the current time.
    pub fn set(key: impl Into<String>, value: impl Into<String>, ttl: Option<u64>) -> Self {
        Self::set_at(current_timestamp_secs(), key, value, ttl)
    }

    pub fn set_at(
        timestamp: f64,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Option<u64>,
    ) -> Self {
        Self {
            timestamp,
            key: key.into(),
            op: LogOp::Set {
                value: value.into(),
                ttl,
            },
        }
    }

    /// A DEL record stamped with the current time.
    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            timestamp: current_timestamp_secs(),
            key: key.into(),
            op: LogOp::Del,
        }
    }

    pub fn action(&self) -> LogAction {
        match self.op {
            LogOp::Set { .. } => LogAction::Set,
            LogOp::Del => LogAction::Del,
        }
    }

    /// Absolute expiry in Unix milliseconds for a SET carrying a TTL.
    ///
    /// Equivalent to `now + (ttl - (now - timestamp))`, so the remaining TTL
    /// at any `now` is positive exactly when `now` is before this deadline.
    pub fn deadline_ms(&self) -> Option<u64> {
        match self.op {
            LogOp::Set { ttl: Some(ttl), .. } => {
                Some(((self.timestamp + ttl as f64) * 1000.0) as u64)
            }
            _ => None,
        }
    }

    // == Encode ==
    /// Encodes the record as a single line without the trailing newline.
    pub fn encode(&self) -> Result<String> {
        let (value, ttl) = match &self.op {
            LogOp::Set { value, ttl } => (Some(value.as_str()), *ttl),
            LogOp::Del => (None, None),
        };
        let wire = WireRecordRef {
            timestamp: self.timestamp,
            action: self.action(),
            key: &self.key,
            value,
            ttl,
        };
        serde_json::to_string(&wire)
            .map_err(|e| StoreError::Internal(format!("failed to encode log record: {e}")))
    }

    // == Decode ==
    /// Decodes one line. `line_no` is 1-based and only used for diagnostics.
    pub fn decode(line: &str, line_no: usize) -> Result<Self> {
        let corrupt = |reason: String| StoreError::CorruptLogEntry {
            line: line_no,
            reason,
        };

        let wire: WireRecord =
            serde_json::from_str(line.trim()).map_err(|e| corrupt(e.to_string()))?;

        if !wire.timestamp.is_finite() {
            return Err(corrupt("timestamp is not a finite number".to_string()));
        }

        let op = match wire.action {
            LogAction::Set => {
                let value = wire
                    .value
                    .ok_or_else(|| corrupt("SET record without a value".to_string()))?;
                LogOp::Set {
                    value,
                    ttl: wire.ttl,
                }
            }
            LogAction::Del => LogOp::Del,
        };

        Ok(Self {
            timestamp: wire.timestamp,
            key: wire.key,
            op,
        })
    }
}
