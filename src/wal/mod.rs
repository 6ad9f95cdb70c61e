//! Write-Ahead Log Module
//!
//! Durable, line-oriented record of every mutation applied to the cache.

mod log_file;
mod record;

pub use log_file::{Replay, SwapOutcome, WriteAheadLog};
pub use record::{LogAction, LogOp, LogRecord};
