//! API Module
//!
//! The thin HTTP layer over the store.
//!
//! # Endpoints
//! - `POST /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /delete/:key` - Delete a key
//! - `GET /stats` - Get store statistics
//! - `POST /compact` - Compact the write-ahead log
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
