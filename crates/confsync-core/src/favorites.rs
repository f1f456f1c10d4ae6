//! Per-user state layered over the schedule: favorites and votes.
//!
//! Favorites are held in memory and written through to the store on every
//! change. Votes are cast by the voting feature; here they are looked up
//! and imported in bulk.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::LocalStore;
use crate::models::{Vote, Votes};

/// Favorited event ids, per conference id
pub type FavoritesIndex = BTreeMap<i64, BTreeSet<i64>>;

pub struct FavoritesProjector {
    store: Arc<dyn LocalStore>,
    favorites: Mutex<FavoritesIndex>,
}

impl FavoritesProjector {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        let favorites = store.load_favorites().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load favorites, starting empty");
            FavoritesIndex::new()
        });
        Self {
            store,
            favorites: Mutex::new(favorites),
        }
    }

    pub fn is_favorited(&self, conference_id: i64, event_id: i64) -> bool {
        self.favorites
            .lock()
            .get(&conference_id)
            .map(|events| events.contains(&event_id))
            .unwrap_or(false)
    }

    /// Favorited event ids for one conference, in ascending order
    pub fn favorites_for(&self, conference_id: i64) -> Vec<i64> {
        self.favorites
            .lock()
            .get(&conference_id)
            .map(|events| events.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Add (`remove == false`) or remove (`remove == true`) a favorite.
    ///
    /// Adding a present id or removing an absent one is a no-op. The change
    /// only becomes visible once the store has accepted it.
    pub fn toggle_favorite(&self, conference_id: i64, event_id: i64, remove: bool) -> Result<()> {
        let mut favorites = self.favorites.lock();
        let present = favorites
            .get(&conference_id)
            .map(|events| events.contains(&event_id))
            .unwrap_or(false);
        if present != remove {
            return Ok(());
        }

        let mut updated = favorites.clone();
        if remove {
            if let Some(events) = updated.get_mut(&conference_id) {
                events.remove(&event_id);
                if events.is_empty() {
                    updated.remove(&conference_id);
                }
            }
        } else {
            updated.entry(conference_id).or_default().insert(event_id);
        }

        self.store
            .store_favorites(&updated)
            .context("Failed to persist favorites")?;
        *favorites = updated;
        debug!(conference_id, event_id, remove, "Favorite updated");
        Ok(())
    }

    /// The vote cast for an event, if any
    pub fn lookup_vote(&self, conference_id: i64, event_id: i64) -> Option<Vote> {
        let votes = match self.store.load_votes() {
            Ok(votes) => votes,
            Err(e) => {
                debug!(error = %e, "Failed to load votes");
                return None;
            }
        };
        votes
            .into_values()
            .find(|vote| vote.conference_id == conference_id && vote.talk_id == event_id)
    }

    /// Merge votes into the stored set. Entries with an existing key replace
    /// the stored vote. Returns how many votes are stored afterwards.
    pub fn import_votes(&self, votes: Votes) -> Result<usize> {
        let mut stored = self.store.load_votes().context("Failed to load votes")?;
        let imported = votes.len();
        stored.extend(votes);
        self.store
            .store_votes(&stored)
            .context("Failed to persist votes")?;
        debug!(imported, total = stored.len(), "Votes imported");
        Ok(stored.len())
    }
}
