//! The refresh state machine.
//!
//! A refresh decides whether the network is worth trying, performs at most
//! one fetch, and reconciles the response with what is already cached:
//!
//! - With a cached dataset, the server's `Last-Modified` marker decides
//!   whether anything changed. An unchanged marker wins over a transport
//!   error, so a flaky connection never hides data that is known current.
//! - On first run there is nothing to fall back on, so any usable body is
//!   taken and every error is surfaced.
//!
//! Refreshes are serialized: a second caller waits for the in-flight one and
//! then normally hits the throttle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use tracing::{debug, info, warn};

use super::{FreshnessPolicy, SyncFailure, SyncOutcome, SyncState, UnavailableReason};
use crate::api::{FetchResponse, RemoteFetcher};
use crate::cache::LocalStore;
use crate::clock::Clock;
use crate::models::Dataset;

pub struct SyncEngine {
    store: Arc<dyn LocalStore>,
    fetcher: Arc<dyn RemoteFetcher>,
    clock: Arc<dyn Clock>,
    policy: FreshnessPolicy,
    locator: Option<Url>,
    dataset: RwLock<Option<Arc<Dataset>>>,
    state: Mutex<SyncState>,
    in_flight: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    /// Create an engine, seeding the snapshot from whatever the store holds.
    pub fn new(
        store: Arc<dyn LocalStore>,
        fetcher: Arc<dyn RemoteFetcher>,
        clock: Arc<dyn Clock>,
        policy: FreshnessPolicy,
        locator: Option<Url>,
    ) -> Self {
        let dataset = match store.load_dataset() {
            Ok(dataset) => dataset.map(Arc::new),
            Err(e) => {
                warn!(error = %e, "Failed to load cached schedule, starting empty");
                None
            }
        };
        let state = store.load_sync_state().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load sync state, starting fresh");
            SyncState::default()
        });
        debug!(
            cached = dataset.is_some(),
            last_modified = ?state.last_modified,
            last_attempt = ?state.last_attempt,
            "Sync engine initialized"
        );

        Self {
            store,
            fetcher,
            clock,
            policy,
            locator,
            dataset: RwLock::new(dataset),
            state: Mutex::new(state),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// The last committed dataset, if any
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.read().clone()
    }

    pub fn sync_state(&self) -> SyncState {
        self.state.lock().clone()
    }

    pub fn locator(&self) -> Option<&Url> {
        self.locator.as_ref()
    }

    pub async fn refresh(&self, forced: bool) -> SyncOutcome {
        let _in_flight = self.in_flight.lock().await;

        let Some(locator) = self.locator.clone() else {
            warn!("No schedule source configured");
            return SyncOutcome::Failed(SyncFailure::NoSource);
        };

        let cached = self.dataset();
        let last_attempt = self.state.lock().last_attempt;
        if cached.is_some()
            && !self
                .policy
                .should_attempt_fetch(self.clock.now(), last_attempt, forced)
        {
            debug!(last_attempt = ?last_attempt, "Recent attempt, serving cached schedule");
            return SyncOutcome::Unchanged;
        }

        info!(url = %locator, forced, "Fetching schedule");
        let response = self.fetcher.fetch(&locator).await;
        let now = self.clock.now();
        self.update_state(|state| state.last_attempt = Some(now));

        let outcome = match cached {
            Some(cached) => self.reconcile_cached(cached, response, forced),
            None => self.reconcile_first_run(response),
        };
        debug!(outcome = %outcome, "Refresh finished");
        outcome
    }

    fn reconcile_cached(
        &self,
        cached: Arc<Dataset>,
        response: FetchResponse,
        forced: bool,
    ) -> SyncOutcome {
        match response.last_modified() {
            Some(server_marker) => {
                let stored_marker = self.state.lock().last_modified;
                if !forced && self.policy.is_unchanged(Some(server_marker), stored_marker) {
                    if let Some(ref e) = response.error {
                        debug!(error = %e, "Ignoring transport error, schedule unchanged");
                    }
                    return SyncOutcome::Unchanged;
                }
                if let Some(e) = response.error {
                    warn!(error = %e, retryable = e.is_retryable(), "Schedule fetch failed");
                    return SyncOutcome::Failed(SyncFailure::Transport(e));
                }
                match response.body {
                    Some(body) => self.commit(&body, Some(server_marker)),
                    None => SyncOutcome::Updated(cached),
                }
            }
            None => match response.body {
                Some(body) if forced => self.commit(&body, None),
                _ => {
                    debug!("No usable response, serving cached schedule");
                    SyncOutcome::Unavailable(UnavailableReason::NoConnectivity)
                }
            },
        }
    }

    fn reconcile_first_run(&self, response: FetchResponse) -> SyncOutcome {
        // Stored before the body is validated
        if let Some(server_marker) = response.last_modified() {
            self.update_state(|state| state.last_modified = Some(server_marker));
        }
        if let Some(e) = response.error {
            warn!(error = %e, retryable = e.is_retryable(), "Initial schedule fetch failed");
            return SyncOutcome::Failed(SyncFailure::Transport(e));
        }
        match response.body {
            Some(body) => self.commit(&body, None),
            None => SyncOutcome::Unavailable(UnavailableReason::NoConnectivity),
        }
    }

    /// Decode, persist and publish a new dataset. Nothing changes on a
    /// decode failure.
    fn commit(&self, body: &[u8], marker: Option<DateTime<Utc>>) -> SyncOutcome {
        let dataset = match Dataset::from_json(body) {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                warn!(error = %e, bytes = body.len(), "Failed to parse schedule data");
                return SyncOutcome::Failed(SyncFailure::Parse(e.to_string()));
            }
        };

        if let Err(e) = self.store.store_dataset(&dataset) {
            warn!(error = %e, "Failed to persist schedule, keeping it in memory only");
        }
        *self.dataset.write() = Some(Arc::clone(&dataset));
        if let Some(marker) = marker {
            self.update_state(|state| state.last_modified = Some(marker));
        }

        info!(conferences = dataset.len(), "Schedule updated");
        SyncOutcome::Updated(dataset)
    }

    fn update_state(&self, change: impl FnOnce(&mut SyncState)) {
        let snapshot = {
            let mut state = self.state.lock();
            change(&mut state);
            state.clone()
        };
        if let Err(e) = self.store.store_sync_state(&snapshot) {
            warn!(error = %e, "Failed to persist sync state");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockFetcher, TransportError};
    use crate::cache::MemoryStore;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    const V1: &str = r#"{"conferences": [{"info": {"id": 1, "name": "Berlin"}}]}"#;
    const V2: &str = r#"{"conferences": [{"info": {"id": 1, "name": "Berlin"}}, {"info": {"id": 2, "name": "Seattle"}}]}"#;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 3, 1, 12, 0, 0).unwrap()
    }

    fn marker(value: &str) -> Option<DateTime<Utc>> {
        crate::dates::parse_server_date(value)
    }

    struct Harness {
        store: Arc<MemoryStore>,
        fetcher: Arc<MockFetcher>,
        clock: Arc<ManualClock>,
        engine: SyncEngine,
    }

    fn harness(store: MemoryStore, fetcher: MockFetcher) -> Harness {
        let store = Arc::new(store);
        let fetcher = Arc::new(fetcher);
        let clock = Arc::new(ManualClock::new(start()));
        let engine = SyncEngine::new(
            store.clone(),
            fetcher.clone(),
            clock.clone(),
            FreshnessPolicy::default(),
            Some(Url::parse("https://example.com/conferences.json").unwrap()),
        );
        Harness {
            store,
            fetcher,
            clock,
            engine,
        }
    }

    fn cached_store(last_modified: &str, last_attempt: Option<DateTime<Utc>>) -> MemoryStore {
        MemoryStore::with_dataset(
            Dataset::from_json(V1.as_bytes()).unwrap(),
            SyncState {
                last_modified: marker(last_modified),
                last_attempt,
            },
        )
    }

    #[tokio::test]
    async fn test_no_locator_fails_without_fetching() {
        let fetcher = Arc::new(MockFetcher::repeating(FetchResponse::ok(V1)));
        let engine = SyncEngine::new(
            Arc::new(MemoryStore::new()),
            fetcher.clone(),
            Arc::new(ManualClock::new(start())),
            FreshnessPolicy::default(),
            None,
        );

        let outcome = engine.refresh(true).await;
        assert_eq!(outcome.failure(), Some(&SyncFailure::NoSource));
        assert_eq!(fetcher.calls(), 0);
        assert!(engine.sync_state().last_attempt.is_none());
    }

    #[tokio::test]
    async fn test_throttled_when_cached_and_recent() {
        let h = harness(
            cached_store("2020-01-01", Some(start() - Duration::minutes(5))),
            MockFetcher::repeating(FetchResponse::ok(V2)),
        );

        assert!(h.engine.refresh(false).await.is_unchanged());
        assert_eq!(h.fetcher.calls(), 0);

        // Forced bypasses the throttle
        assert!(h.engine.refresh(true).await.is_updated());
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_first_run_always_fetches_even_when_recent() {
        let store = MemoryStore::new();
        store
            .store_sync_state(&SyncState {
                last_modified: None,
                last_attempt: Some(start()),
            })
            .unwrap();
        let h = harness(store, MockFetcher::repeating(FetchResponse::ok(V1)));

        assert!(h.engine.refresh(false).await.is_updated());
        assert_eq!(h.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_attempt_recorded_on_failure() {
        let h = harness(
            MemoryStore::new(),
            MockFetcher::repeating(FetchResponse::failed(TransportError::Timeout)),
        );
        h.clock.advance(Duration::seconds(3));

        let outcome = h.engine.refresh(false).await;
        assert_eq!(
            outcome.failure(),
            Some(&SyncFailure::Transport(TransportError::Timeout))
        );
        let expected = Some(start() + Duration::seconds(3));
        assert_eq!(h.engine.sync_state().last_attempt, expected);
        assert_eq!(h.store.load_sync_state().unwrap().last_attempt, expected);
        assert!(h.engine.dataset().is_none());
    }

    #[tokio::test]
    async fn test_first_run_stores_marker_even_when_body_is_invalid() {
        let h = harness(
            MemoryStore::new(),
            MockFetcher::repeating(FetchResponse::ok("{not json").with_last_modified("2020-01-01")),
        );

        let outcome = h.engine.refresh(false).await;
        assert!(matches!(outcome, SyncOutcome::Failed(SyncFailure::Parse(_))));
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
        assert!(h.engine.dataset().is_none());
        assert!(h.store.load_dataset().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_first_run_without_body_is_unavailable() {
        let h = harness(
            MemoryStore::new(),
            MockFetcher::repeating(FetchResponse::default()),
        );
        assert!(matches!(
            h.engine.refresh(false).await,
            SyncOutcome::Unavailable(UnavailableReason::NoConnectivity)
        ));
    }

    #[tokio::test]
    async fn test_changed_marker_with_error_fails_and_keeps_cache() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(
                FetchResponse::failed(TransportError::ServerError("down".into()))
                    .with_last_modified("2020-02-01"),
            ),
        );

        let outcome = h.engine.refresh(false).await;
        assert!(matches!(
            outcome,
            SyncOutcome::Failed(SyncFailure::Transport(TransportError::ServerError(_)))
        ));
        assert_eq!(h.engine.dataset().unwrap().len(), 1);
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
    }

    #[tokio::test]
    async fn test_same_marker_forced_refetches() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(FetchResponse::ok(V2).with_last_modified("2020-01-01")),
        );

        let outcome = h.engine.refresh(true).await;
        assert_eq!(outcome.dataset().map(|d| d.len()), Some(2));
    }

    #[tokio::test]
    async fn test_changed_marker_without_body_keeps_cached_dataset() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(FetchResponse::default().with_last_modified("2020-02-01")),
        );

        let outcome = h.engine.refresh(false).await;
        assert_eq!(outcome.dataset().map(|d| d.len()), Some(1));
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
    }

    #[tokio::test]
    async fn test_changed_marker_with_invalid_body_keeps_cache() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(FetchResponse::ok("[1, 2").with_last_modified("2020-02-01")),
        );

        let outcome = h.engine.refresh(false).await;
        assert!(matches!(outcome, SyncOutcome::Failed(SyncFailure::Parse(_))));
        assert_eq!(h.engine.dataset().unwrap().len(), 1);
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
    }

    #[tokio::test]
    async fn test_changed_marker_with_non_dataset_body_keeps_cache() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(
                FetchResponse::ok(r#"{"message": "maintenance"}"#).with_last_modified("2020-02-01"),
            ),
        );

        let outcome = h.engine.refresh(false).await;
        assert!(matches!(outcome, SyncOutcome::Failed(SyncFailure::Parse(_))));
        assert_eq!(h.engine.dataset().unwrap().len(), 1);
        assert_eq!(h.store.load_dataset().unwrap().map(|d| d.len()), Some(1));
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
    }

    #[tokio::test]
    async fn test_unchanged_marker_wins_over_error_with_body() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(
                FetchResponse::ok(V2)
                    .with_last_modified("2020-01-01")
                    .with_error(TransportError::Timeout),
            ),
        );

        assert!(h.engine.refresh(false).await.is_unchanged());
        assert_eq!(h.engine.dataset().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_no_marker_forced_with_body_updates() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(FetchResponse::ok(V2)),
        );

        assert!(matches!(
            h.engine.refresh(false).await,
            SyncOutcome::Unavailable(UnavailableReason::NoConnectivity)
        ));
        let outcome = h.engine.refresh(true).await;
        assert_eq!(outcome.dataset().map(|d| d.len()), Some(2));
        // No marker to record
        assert_eq!(h.engine.sync_state().last_modified, marker("2020-01-01"));
    }

    #[tokio::test]
    async fn test_persist_failure_still_publishes_dataset() {
        let h = harness(
            MemoryStore::new(),
            MockFetcher::repeating(FetchResponse::ok(V1)),
        );
        h.store.set_fail_writes(true);

        assert!(h.engine.refresh(false).await.is_updated());
        assert_eq!(h.engine.dataset().unwrap().len(), 1);
        assert!(h.store.load_dataset().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_throttle_expires() {
        let h = harness(
            cached_store("2020-01-01", None),
            MockFetcher::repeating(FetchResponse::ok(V2).with_last_modified("2020-01-01")),
        );

        assert!(h.engine.refresh(false).await.is_unchanged());
        assert_eq!(h.fetcher.calls(), 1);

        h.clock.advance(Duration::minutes(30));
        assert!(h.engine.refresh(false).await.is_unchanged());
        assert_eq!(h.fetcher.calls(), 1);

        h.clock.advance(Duration::minutes(30));
        assert!(h.engine.refresh(false).await.is_unchanged());
        assert_eq!(h.fetcher.calls(), 2);
    }
}
