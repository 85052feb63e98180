use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{Result, WhosInSpaceError};

/// HTTP layer shared by every source.
///
/// Every request acquires a permit from one semaphore, so the number of
/// requests in flight never exceeds `max_concurrent_requests` no matter how
/// many tasks are fanned out. Each request is bounded by the client timeout
/// and aborts as soon as the cancellation token fires. Nothing is retried.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig, cancel: CancellationToken) -> Result<Self> {
        if config.max_concurrent_requests == 0 {
            return Err(WhosInSpaceError::Config(
                "max-concurrent-requests must be at least 1".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| WhosInSpaceError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests)),
            cancel,
        })
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        self.fetch(url, |response| response.json::<T>()).await
    }

    /// GET `url` and return the body as text.
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        self.fetch(url, reqwest::Response::text).await
    }

    /// Runs one request, holding a permit until the body has been read.
    async fn fetch<T, F, Fut>(&self, url: &Url, read_body: F) -> Result<T>
    where
        F: FnOnce(reqwest::Response) -> Fut,
        Fut: Future<Output = reqwest::Result<T>>,
    {
        let cancelled = || WhosInSpaceError::Cancelled(url.to_string());

        // Semaphore is never closed, so acquire only fails if it is dropped
        let _permit = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(cancelled()),
            permit = self.semaphore.acquire() => permit.map_err(|_| cancelled())?,
        };

        debug!("GET {url}");
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(cancelled()),
            result = self.exchange(url, read_body) => result,
        };

        result.map_err(|e| match e {
            WhosInSpaceError::Network(e) if e.is_timeout() => {
                WhosInSpaceError::Timeout(url.to_string())
            }
            other => other,
        })
    }

    async fn exchange<T, F, Fut>(&self, url: &Url, read_body: F) -> Result<T>
    where
        F: FnOnce(reqwest::Response) -> Fut,
        Fut: Future<Output = reqwest::Result<T>>,
    {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(http_status_error(status, url));
        }
        Ok(read_body(response).await?)
    }

    #[cfg(test)]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

fn http_status_error(status: StatusCode, url: &Url) -> WhosInSpaceError {
    WhosInSpaceError::HttpStatus {
        status: status.as_u16(),
        url: url.to_string(),
    }
}

/// Parse a configured base URL, making sure it ends with a slash so that
/// `Url::join` appends to it instead of replacing its last segment.
pub fn base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    Url::parse(&normalized)
        .map_err(|e| WhosInSpaceError::Config(format!("Invalid base URL '{raw}': {e}")))
}

#[cfg(test)]
pub(crate) fn test_fetch_config(
    timeout: std::time::Duration,
    max_concurrent_requests: usize,
) -> FetchConfig {
    FetchConfig {
        timeout_secs: timeout.as_secs().max(1),
        max_concurrent_requests,
        user_agent: "whosinspace-test".to_string(),
    }
}

/// A local server that accepts connections and never answers, so requests
/// to it stay in flight until they time out or are cancelled.
#[cfg(test)]
pub(crate) async fn unresponsive_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
        }
    });
    format!("http://{addr}")
}
