//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Log compaction: rewrites the WAL down to the live key set

mod compaction;

pub use compaction::spawn_compaction_task;
