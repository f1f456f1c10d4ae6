use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Server marker of the dataset we hold
    pub last_modified: Option<DateTime<Utc>>,
    /// When we last tried to reach the source, successful or not
    pub last_attempt: Option<DateTime<Utc>>,
}
