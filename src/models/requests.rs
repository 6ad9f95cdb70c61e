//! Request DTOs for the store API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for the SET operation (POST /set)
///
/// Field limits (non-empty key, key and value sizes, positive TTL) are
/// enforced by the store itself.
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The key
    pub key: String,
    /// The value to store
    pub value: String,
    /// Optional TTL in seconds; omitted means the key never expires
    #[serde(default)]
    pub ttl: Option<u64>,
}
