//! Infrastructure implementations.
//!
//! Port traits and their adapters: SQLite repositories, credentials, caches
//! and the clock, plus startup configuration.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod lookup_cache;
pub mod ports;
pub mod sqlite;
