use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::favorites::FavoritesIndex;
use crate::models::{Dataset, Votes};
use crate::sync::SyncState;

/// Typed repository for everything the core persists.
///
/// Loads of entities that were never stored return their empty value
/// (`None` for the dataset, defaults for the rest).
pub trait LocalStore: Send + Sync {
    fn load_dataset(&self) -> Result<Option<Dataset>>;
    fn store_dataset(&self, dataset: &Dataset) -> Result<()>;

    /// When the stored dataset was written, if the store keeps track.
    fn dataset_saved_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn load_sync_state(&self) -> Result<SyncState>;
    fn store_sync_state(&self, state: &SyncState) -> Result<()>;

    fn load_favorites(&self) -> Result<FavoritesIndex>;
    fn store_favorites(&self, favorites: &FavoritesIndex) -> Result<()>;

    fn load_votes(&self) -> Result<Votes>;
    fn store_votes(&self, votes: &Votes) -> Result<()>;
}
