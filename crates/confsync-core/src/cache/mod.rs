//! Local persistence for offline data access.
//!
//! The `LocalStore` trait is the only way the sync engine and the favorites
//! projector touch durable storage. Two implementations are provided:
//!
//! - `FileStore`: JSON files in a cache directory, durable across restarts
//! - `MemoryStore`: in-process maps, for tests and ephemeral sessions
//!
//! Persisted entities:
//! - The decoded conference dataset
//! - Sync state (last-modified marker, last connection attempt)
//! - Favorited events per conference
//! - Votes cast by the user

pub mod manager;
pub mod memory;
pub mod store;

pub use manager::{CachedData, FileStore};
pub use memory::MemoryStore;
pub use store::LocalStore;
