use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::store::LocalStore;
use crate::favorites::FavoritesIndex;
use crate::models::{Dataset, Votes};
use crate::sync::SyncState;

const DATASET_FILE: &str = "conferences";
const SYNC_STATE_FILE: &str = "sync_state";
const FAVORITES_FILE: &str = "favorites";
const VOTES_FILE: &str = "votes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }
}

/// JSON-file backed store rooted at a cache directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    /// Write through a temporary file so a crash never leaves a half-written
    /// cache file behind.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let tmp_path = self.cache_dir.join(format!("{}.json.tmp", name));
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&tmp_path, contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace cache file: {}", name))?;
        debug!(cache = name, "Cache file written");
        Ok(())
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        Ok(self.load(name)?.map(|cached| cached.data).unwrap_or_default())
    }
}

impl LocalStore for FileStore {
    fn load_dataset(&self) -> Result<Option<Dataset>> {
        Ok(self.load(DATASET_FILE)?.map(|cached| cached.data))
    }

    fn store_dataset(&self, dataset: &Dataset) -> Result<()> {
        self.save(DATASET_FILE, dataset)
    }

    fn dataset_saved_at(&self) -> Option<DateTime<Utc>> {
        match self.load::<Dataset>(DATASET_FILE) {
            Ok(cached) => cached.map(|cached| cached.cached_at),
            Err(e) => {
                debug!(cache = DATASET_FILE, error = %e, "Failed to read cache timestamp");
                None
            }
        }
    }

    fn load_sync_state(&self) -> Result<SyncState> {
        self.load_or_default(SYNC_STATE_FILE)
    }

    fn store_sync_state(&self, state: &SyncState) -> Result<()> {
        self.save(SYNC_STATE_FILE, state)
    }

    fn load_favorites(&self) -> Result<FavoritesIndex> {
        self.load_or_default(FAVORITES_FILE)
    }

    fn store_favorites(&self, favorites: &FavoritesIndex) -> Result<()> {
        self.save(FAVORITES_FILE, favorites)
    }

    fn load_votes(&self) -> Result<Votes> {
        self.load_or_default(VOTES_FILE)
    }

    fn store_votes(&self, votes: &Votes) -> Result<()> {
        self.save(VOTES_FILE, votes)
    }
}

// ============================================================================
// Tests
// ============================================================================
