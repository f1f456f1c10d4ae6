//! Remote data source access.
//!
//! This module provides the `RemoteFetcher` abstraction the sync engine
//! talks to, and its implementations:
//!
//! - `HttpFetcher`: `http`/`https` via reqwest, plus `file` locators for
//!   bundled or mirrored schedule files
//! - `MockFetcher`: replays scripted responses and counts requests
//!
//! A fetch never fails outright: transport problems are reported inside the
//! `FetchResponse` next to whatever headers were received, because the sync
//! engine still needs the `Last-Modified` header when the body is unusable.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod mock;

pub use client::HttpFetcher;
pub use error::TransportError;
pub use fetcher::{FetchResponse, RemoteFetcher, LAST_MODIFIED_HEADER};
pub use mock::MockFetcher;
