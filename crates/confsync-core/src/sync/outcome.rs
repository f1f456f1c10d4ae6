use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::api::TransportError;
use crate::models::Dataset;

/// Result of a refresh. Never an unhandled fault; the caller decides how to
/// surface `Unavailable` and `Failed` to the user.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// A dataset is available that the caller should (re)display
    Updated(Arc<Dataset>),
    /// Nothing new; the cached dataset is current
    Unchanged,
    /// No new data could be obtained, cached data (if any) remains valid
    Unavailable(UnavailableReason),
    /// The refresh failed; the previous dataset is retained
    Failed(SyncFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    NoConnectivity,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncFailure {
    #[error("No data source configured")]
    NoSource,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid schedule data: {0}")]
    Parse(String),
}

impl SyncOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, SyncOutcome::Updated(_))
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, SyncOutcome::Unchanged)
    }

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        match self {
            SyncOutcome::Updated(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SyncFailure> {
        match self {
            SyncOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Updated(dataset) => {
                write!(f, "Updated ({} conferences)", dataset.len())
            }
            SyncOutcome::Unchanged => write!(f, "Up to date"),
            SyncOutcome::Unavailable(UnavailableReason::NoConnectivity) => {
                write!(f, "Offline - showing cached schedule")
            }
            SyncOutcome::Failed(failure) => write!(f, "Refresh failed: {}", failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let updated = SyncOutcome::Updated(Arc::new(Dataset::default()));
        assert!(updated.is_updated());
        assert!(updated.dataset().is_some());
        assert!(updated.failure().is_none());

        let failed = SyncOutcome::Failed(SyncFailure::NoSource);
        assert_eq!(failed.failure(), Some(&SyncFailure::NoSource));
        assert!(failed.dataset().is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(SyncOutcome::Unchanged.to_string(), "Up to date");
        let failed = SyncOutcome::Failed(TransportError::Timeout.into());
        assert_eq!(failed.to_string(), "Refresh failed: Transport error: Request timed out");
    }
}
