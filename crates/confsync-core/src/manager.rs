//! The single owner of schedule state.
//!
//! `ScheduleManager` is constructed once at startup and shared (typically
//! behind an `Arc`) with everything that displays or changes schedule data.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::debug;

use crate::api::{HttpFetcher, RemoteFetcher};
use crate::cache::{FileStore, LocalStore};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::favorites::FavoritesProjector;
use crate::models::{Conference, Dataset, Vote, Votes};
use crate::sync::{FreshnessPolicy, SyncEngine, SyncOutcome, SyncState};

pub struct ScheduleManager {
    store: Arc<dyn LocalStore>,
    engine: SyncEngine,
    favorites: FavoritesProjector,
    selected_conference: AtomicUsize,
}

impl ScheduleManager {
    pub fn new(
        store: Arc<dyn LocalStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        clock: Arc<dyn Clock>,
        policy: FreshnessPolicy,
        locator: Option<Url>,
    ) -> Self {
        Self {
            engine: SyncEngine::new(Arc::clone(&store), fetcher, clock, policy, locator),
            favorites: FavoritesProjector::new(Arc::clone(&store)),
            store,
            selected_conference: AtomicUsize::new(0),
        }
    }

    /// Wire up the file store, HTTP fetcher and system clock from config
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = Arc::new(FileStore::new(config.cache_dir()?)?);
        let fetcher = Arc::new(HttpFetcher::new()?);
        Ok(Self::new(
            store,
            fetcher,
            Arc::new(SystemClock),
            config.freshness_policy(),
            config.locator(),
        ))
    }

    // ===== Sync =====

    pub async fn refresh(&self, forced: bool) -> SyncOutcome {
        self.engine.refresh(forced).await
    }

    pub fn current_dataset(&self) -> Option<Arc<Dataset>> {
        self.engine.dataset()
    }

    pub fn sync_state(&self) -> SyncState {
        self.engine.sync_state()
    }

    pub fn locator(&self) -> Option<&Url> {
        self.engine.locator()
    }

    /// When the cached dataset was last written to the store
    pub fn dataset_saved_at(&self) -> Option<DateTime<Utc>> {
        self.store.dataset_saved_at()
    }

    // ===== Conference Selection =====

    pub fn select_conference(&self, index: usize) {
        debug!(index, "Conference selected");
        self.selected_conference.store(index, Ordering::SeqCst);
    }

    pub fn selected_conference_index(&self) -> usize {
        self.selected_conference.load(Ordering::SeqCst)
    }

    /// The selected conference, or `None` when there is no dataset or the
    /// selection is out of range.
    pub fn current_conference(&self) -> Option<Conference> {
        let dataset = self.current_dataset()?;
        dataset.conference(self.selected_conference_index()).cloned()
    }

    // ===== Favorites & Votes =====

    pub fn is_favorited(&self, conference_id: i64, event_id: i64) -> bool {
        self.favorites.is_favorited(conference_id, event_id)
    }

    pub fn toggle_favorite(&self, conference_id: i64, event_id: i64, remove: bool) -> Result<()> {
        self.favorites.toggle_favorite(conference_id, event_id, remove)
    }

    pub fn favorites_for(&self, conference_id: i64) -> Vec<i64> {
        self.favorites.favorites_for(conference_id)
    }

    pub fn lookup_vote(&self, conference_id: i64, event_id: i64) -> Option<Vote> {
        self.favorites.lookup_vote(conference_id, event_id)
    }

    pub fn import_votes(&self, votes: Votes) -> Result<usize> {
        self.favorites.import_votes(votes)
    }
}
