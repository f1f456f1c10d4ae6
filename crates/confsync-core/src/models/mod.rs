//! Data models for the conference dataset.
//!
//! This module contains the structures decoded from the remote schedule
//! payload and the per-user records layered on top of it:
//!
//! - `Dataset`, `Conference`, `ConferenceInfo`: the synchronized schedule data
//! - `Event`, `Track`, `Location`, `Speaker`: scheduled items and their details
//! - `Vote`, `VoteType`: votes cast by the user, stored outside the dataset

pub mod conference;
pub mod event;
pub mod vote;

pub use conference::{Conference, ConferenceInfo, Dataset, Sponsor};
pub use event::{Event, Location, Speaker, Track, EVENT_TYPE_CONFERENCE};
pub use vote::{Vote, VoteType, Votes};
