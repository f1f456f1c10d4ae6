use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;

use super::{FetchResponse, RemoteFetcher, TransportError};

/// A fetcher that replays scripted responses.
///
/// Queued responses are returned in order; once the queue is empty the
/// repeating response (if any) is returned for every further call.
#[derive(Debug, Default)]
pub struct MockFetcher {
    queue: Mutex<VecDeque<FetchResponse>>,
    repeat: Mutex<Option<FetchResponse>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<Url>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `response`
    pub fn repeating(response: FetchResponse) -> Self {
        let fetcher = Self::new();
        *fetcher.repeat.lock() = Some(response);
        fetcher
    }

    pub fn push_response(&self, response: FetchResponse) {
        self.queue.lock().push_back(response);
    }

    /// Hold every request for `delay` before answering
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Url> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl RemoteFetcher for MockFetcher {
    async fn fetch(&self, locator: &Url) -> FetchResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().push(locator.clone());

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queue.lock().pop_front();
        queued
            .or_else(|| self.repeat.lock().clone())
            .unwrap_or_else(|| {
                FetchResponse::failed(TransportError::Network("no scripted response".to_string()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_then_repeat() {
        let fetcher = MockFetcher::repeating(FetchResponse::ok("repeat"));
        fetcher.push_response(FetchResponse::ok("first"));
        let url = Url::parse("https://example.com/conferences.json").unwrap();

        assert_eq!(fetcher.fetch(&url).await.body.as_deref(), Some(b"first".as_slice()));
        assert_eq!(fetcher.fetch(&url).await.body.as_deref(), Some(b"repeat".as_slice()));
        assert_eq!(fetcher.calls(), 2);
        assert_eq!(fetcher.requested(), vec![url.clone(), url]);
    }

    #[tokio::test]
    async fn test_unscripted_call_fails() {
        let fetcher = MockFetcher::new();
        let url = Url::parse("https://example.com/").unwrap();
        assert!(fetcher.fetch(&url).await.error.is_some());
    }
}
