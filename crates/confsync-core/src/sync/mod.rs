//! Synchronization of the conference dataset with its remote source.
//!
//! - `FreshnessPolicy`: throttles network attempts and compares
//!   last-modified markers
//! - `SyncEngine`: runs a refresh and reconciles the response with the
//!   cached dataset
//! - `SyncOutcome`: what a refresh produced, as a typed value
//! - `SyncState`: persisted bookkeeping (last-modified marker, last attempt)

pub mod engine;
pub mod outcome;
pub mod policy;
pub mod state;

pub use engine::SyncEngine;
pub use outcome::{SyncFailure, SyncOutcome, UnavailableReason};
pub use policy::{should_attempt_fetch, FreshnessPolicy, DEFAULT_MIN_FETCH_INTERVAL_MINUTES};
pub use state::SyncState;
