use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;

use super::TransportError;
use crate::dates::parse_server_date;

/// Header carrying the server's modification timestamp
pub const LAST_MODIFIED_HEADER: &str = "last-modified";

/// Outcome of a single request against the remote source.
///
/// Headers and body are kept even when `error` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResponse {
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub error: Option<TransportError>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_last_modified(self, value: &str) -> Self {
        self.with_header("Last-Modified", value)
    }

    pub fn with_error(mut self, error: TransportError) -> Self {
        self.error = Some(error);
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The server's last-modified marker, if present and parseable
    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.header(LAST_MODIFIED_HEADER).and_then(parse_server_date)
    }
}

/// Performs one request against a resource locator.
///
/// Timeouts are the implementation's business; a timed-out request comes
/// back as a response carrying `TransportError::Timeout`.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, locator: &Url) -> FetchResponse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_last_modified_lookup_is_case_insensitive() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        for name in ["Last-Modified", "last-modified", "LAST-MODIFIED"] {
            let response = FetchResponse::default().with_header(name, "Wed, 01 Jan 2020 00:00:00 GMT");
            assert_eq!(response.last_modified(), Some(expected));
        }
    }

    #[test]
    fn test_unparseable_marker_is_absent() {
        let response = FetchResponse::ok("{}").with_last_modified("not a date");
        assert_eq!(response.header("last-modified"), Some("not a date"));
        assert_eq!(response.last_modified(), None);
    }

    #[test]
    fn test_failed_response_keeps_headers() {
        let response = FetchResponse::failed(TransportError::Timeout).with_last_modified("2020-01-01");
        assert!(response.last_modified().is_some());
        assert_eq!(response.error, Some(TransportError::Timeout));
        assert!(response.body.is_none());
    }
}
