//! walkv - A persistent LRU key-value store
//!
//! An in-memory LRU cache with optional per-key TTL, made durable by an
//! append-only write-ahead log that is replayed on start-up and compacted
//! in the background.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;
pub mod wal;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, StoreError};
pub use store::{StatsSnapshot, Store};
