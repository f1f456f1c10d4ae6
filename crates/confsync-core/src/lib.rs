//! confsync core library.
//!
//! Keeps a local copy of a conference schedule in sync with its remote
//! source and layers per-user state (favorites, votes) on top of it.
//!
//! - `sync`: freshness policy and the refresh state machine
//! - `cache`: typed local persistence (`FileStore`, `MemoryStore`)
//! - `api`: remote fetching (`HttpFetcher`, `MockFetcher`)
//! - `favorites`: favorites and vote lookups
//! - `manager`: `ScheduleManager`, the single owner of schedule state
//! - `models`: the decoded dataset and vote records
//! - `config`, `clock`, `dates`: configuration, time source, date helpers

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod dates;
pub mod favorites;
pub mod manager;
pub mod models;
pub mod sync;

pub use api::{FetchResponse, HttpFetcher, MockFetcher, RemoteFetcher, TransportError};
pub use cache::{FileStore, LocalStore, MemoryStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use favorites::{FavoritesIndex, FavoritesProjector};
pub use manager::ScheduleManager;
pub use reqwest::Url;
pub use models::{Conference, Dataset, Event, Vote, VoteType, Votes};
pub use sync::{
    should_attempt_fetch, FreshnessPolicy, SyncEngine, SyncFailure, SyncOutcome, SyncState,
    UnavailableReason,
};
