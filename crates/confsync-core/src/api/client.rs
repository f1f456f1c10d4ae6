//! HTTP and file-backed implementation of `RemoteFetcher`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode, Url};
use tracing::{debug, warn};

use super::{FetchResponse, RemoteFetcher, TransportError, LAST_MODIFIED_HEADER};
use crate::dates::format_http_date;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetcher for `http`, `https` and `file` locators.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, url: &Url) -> FetchResponse {
        let response = match self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to send schedule request");
                return FetchResponse::failed(TransportError::from_reqwest(&e));
            }
        };

        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        debug!(url = %url, status = %status, "Schedule response received");

        if status == StatusCode::NOT_MODIFIED {
            return FetchResponse {
                headers,
                body: None,
                error: None,
            };
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return FetchResponse {
                headers,
                body: None,
                error: Some(TransportError::from_status(status.as_u16(), &body)),
            };
        }

        match response.bytes().await {
            Ok(bytes) => FetchResponse {
                headers,
                body: Some(bytes.to_vec()),
                error: None,
            },
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read schedule response body");
                FetchResponse {
                    headers,
                    body: None,
                    error: Some(TransportError::from_reqwest(&e)),
                }
            }
        }
    }

    /// Read a local schedule file, reporting its mtime as `Last-Modified`.
    async fn fetch_file(&self, url: &Url) -> FetchResponse {
        let path = match url.to_file_path() {
            Ok(path) => path,
            Err(()) => {
                return FetchResponse::failed(TransportError::Io(format!(
                    "not a local path: {}",
                    url
                )))
            }
        };

        match tokio::task::spawn_blocking(move || read_file(path)).await {
            Ok(Ok((body, modified))) => {
                let mut response = FetchResponse::ok(body);
                if let Some(modified) = modified {
                    response = response.with_header(LAST_MODIFIED_HEADER, &format_http_date(&modified));
                }
                response
            }
            Ok(Err(e)) => FetchResponse::failed(TransportError::Io(e.to_string())),
            Err(e) => FetchResponse::failed(TransportError::Io(e.to_string())),
        }
    }
}

fn read_file(path: PathBuf) -> std::io::Result<(Vec<u8>, Option<DateTime<Utc>>)> {
    let body = std::fs::read(&path)?;
    let modified = std::fs::metadata(&path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t: SystemTime| DateTime::<Utc>::from(t));
    Ok((body, modified))
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch(&self, locator: &Url) -> FetchResponse {
        match locator.scheme() {
            "http" | "https" => self.fetch_http(locator).await,
            "file" => self.fetch_file(locator).await,
            other => FetchResponse::failed(TransportError::UnsupportedScheme(other.to_string())),
        }
    }
}
