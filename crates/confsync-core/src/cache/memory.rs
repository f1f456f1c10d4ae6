use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::store::LocalStore;
use crate::favorites::FavoritesIndex;
use crate::models::{Dataset, Votes};
use crate::sync::SyncState;

/// In-memory store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dataset: Mutex<Option<Dataset>>,
    dataset_saved_at: Mutex<Option<DateTime<Utc>>>,
    sync_state: Mutex<SyncState>,
    favorites: Mutex<FavoritesIndex>,
    votes: Mutex<Votes>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a previously synchronized dataset and its marker
    pub fn with_dataset(dataset: Dataset, sync_state: SyncState) -> Self {
        let store = Self::new();
        *store.dataset.lock() = Some(dataset);
        *store.sync_state.lock() = sync_state;
        store
    }

    /// Make every subsequent write fail, to exercise error paths.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("memory store is read-only");
        }
        Ok(())
    }
}

impl LocalStore for MemoryStore {
    fn load_dataset(&self) -> Result<Option<Dataset>> {
        Ok(self.dataset.lock().clone())
    }

    fn store_dataset(&self, dataset: &Dataset) -> Result<()> {
        self.check_writable()?;
        *self.dataset.lock() = Some(dataset.clone());
        *self.dataset_saved_at.lock() = Some(Utc::now());
        Ok(())
    }

    fn dataset_saved_at(&self) -> Option<DateTime<Utc>> {
        *self.dataset_saved_at.lock()
    }

    fn load_sync_state(&self) -> Result<SyncState> {
        Ok(self.sync_state.lock().clone())
    }

    fn store_sync_state(&self, state: &SyncState) -> Result<()> {
        self.check_writable()?;
        *self.sync_state.lock() = state.clone();
        Ok(())
    }

    fn load_favorites(&self) -> Result<FavoritesIndex> {
        Ok(self.favorites.lock().clone())
    }

    fn store_favorites(&self, favorites: &FavoritesIndex) -> Result<()> {
        self.check_writable()?;
        *self.favorites.lock() = favorites.clone();
        Ok(())
    }

    fn load_votes(&self) -> Result<Votes> {
        Ok(self.votes.lock().clone())
    }

    fn store_votes(&self, votes: &Votes) -> Result<()> {
        self.check_writable()?;
        *self.votes.lock() = votes.clone();
        Ok(())
    }
}
