// etcd v2 KeyValueStore implementation
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tracing::{debug, info, warn};

use envetcd_core::domain::{RawEntry, StoreConfig};
use envetcd_core::port::key_value_store::{KeyValueStore, StoreError};

use crate::members::fetch_client_urls;
use crate::response::{ErrorResponse, KeysResponse, ERROR_CODE_KEY_NOT_FOUND};
use crate::retry::{RetryDecision, RetryPolicy};

/// Delay before the second attempt against a peer
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(100);

/// Outcome of one HTTP attempt that did not produce entries
enum AttemptError {
    /// Transport failure or 5xx: try again / try the next peer
    Retryable(String),
    /// The store answered, but not with something we can use
    Fatal(StoreError),
}

/// etcd store reached over the v2 HTTP keys API
///
/// Peers are tried in order; each gets the full retry budget before the
/// next one is used.
pub struct EtcdKeyValueStore {
    client: reqwest::Client,
    peers: Vec<String>,
    retry: RetryPolicy,
}

impl EtcdKeyValueStore {
    /// Create a store over already-normalized peer URLs
    ///
    /// # Arguments
    /// * `peers` - Absolute peer URLs (see `normalize_peers`)
    /// * `timeout` - Per-request timeout
    /// * `retry` - Per-peer retry budget
    pub fn new(peers: Vec<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self, StoreError> {
        if peers.is_empty() {
            return Err(StoreError::Unavailable {
                attempts: 0,
                reason: "no peers configured".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            peers,
            retry,
        })
    }

    /// Create a store from configuration, syncing cluster members if requested
    pub async fn connect(config: &StoreConfig, peers: Vec<String>) -> Result<Self, StoreError> {
        let retry = RetryPolicy::new(config.max_attempts, DEFAULT_RETRY_BASE_DELAY);
        let mut store = Self::new(peers, config.timeout, retry)?;

        if config.sync {
            store.sync_members().await?;
        }

        Ok(store)
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    /// Replace the peer list with the client URLs the cluster advertises
    ///
    /// # Errors
    /// - StoreError::Unavailable if no configured peer answers the members request
    pub async fn sync_members(&mut self) -> Result<(), StoreError> {
        let mut last_error = String::new();
        let configured = self.peers.clone();

        for peer in &configured {
            match fetch_client_urls(&self.client, peer).await {
                Ok(urls) if !urls.is_empty() => {
                    info!(peer = %peer, peers = ?urls, "Synced cluster members");
                    self.peers = urls;
                    return Ok(());
                }
                Ok(_) => {
                    warn!(peer = %peer, "Cluster advertised no client URLs");
                    last_error = format!("{peer} advertised no client URLs");
                }
                Err(reason) => {
                    warn!(peer = %peer, error = %reason, "Member sync failed");
                    last_error = reason;
                }
            }
        }

        Err(StoreError::Unavailable {
            attempts: configured.len() as u32,
            reason: format!("cannot sync with cluster members: {last_error}"),
        })
    }

    async fn fetch_once(&self, peer: &str, path: &str) -> Result<Vec<RawEntry>, AttemptError> {
        let url = keys_url(peer, path).map_err(AttemptError::Fatal)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let body: KeysResponse = response
                .json()
                .await
                .map_err(|e| AttemptError::Fatal(StoreError::InvalidResponse(e.to_string())))?;
            return Ok(body.node.flatten());
        }

        if status == StatusCode::NOT_FOUND {
            let body: ErrorResponse = response
                .json()
                .await
                .map_err(|e| AttemptError::Fatal(StoreError::InvalidResponse(e.to_string())))?;

            if body.error_code == ERROR_CODE_KEY_NOT_FOUND {
                debug!(path = %path, "Key not found, treating as empty");
                return Ok(Vec::new());
            }

            return Err(AttemptError::Fatal(StoreError::InvalidResponse(format!(
                "etcd error {}: {}",
                body.error_code, body.message
            ))));
        }

        if status.is_server_error() {
            return Err(AttemptError::Retryable(format!("HTTP {status}")));
        }

        Err(AttemptError::Fatal(StoreError::InvalidResponse(format!(
            "unexpected HTTP status {status}"
        ))))
    }
}

/// `{peer}/v2/keys{path}?recursive=true&sorted=true`
fn keys_url(peer: &str, path: &str) -> Result<Url, StoreError> {
    let mut url = Url::parse(peer)
        .map_err(|e| StoreError::InvalidResponse(format!("invalid peer URL '{peer}': {e}")))?;

    let path = path.trim_start_matches('/');
    url.set_path(&format!("/v2/keys/{path}"));
    url.query_pairs_mut()
        .append_pair("recursive", "true")
        .append_pair("sorted", "true");

    Ok(url)
}

#[async_trait]
impl KeyValueStore for EtcdKeyValueStore {
    async fn fetch_recursive(&self, path: &str) -> Result<Vec<RawEntry>, StoreError> {
        let mut total_attempts = 0;
        let mut last_error = String::new();

        for peer in &self.peers {
            let mut attempt = 0;
            loop {
                attempt += 1;
                total_attempts += 1;

                match self.fetch_once(peer, path).await {
                    Ok(entries) => {
                        debug!(peer = %peer, path = %path, entries = entries.len(), "Fetched");
                        return Ok(entries);
                    }
                    Err(AttemptError::Fatal(e)) => return Err(e),
                    Err(AttemptError::Retryable(reason)) => {
                        warn!(
                            peer = %peer,
                            path = %path,
                            attempt = attempt,
                            error = %reason,
                            "Store request failed"
                        );
                        last_error = format!("{peer}: {reason}");

                        match self.retry.should_retry(attempt) {
                            RetryDecision::Retry(delay) => tokio::time::sleep(delay).await,
                            RetryDecision::GiveUp => break,
                        }
                    }
                }
            }
        }

        Err(StoreError::Unavailable {
            attempts: total_attempts,
            reason: last_error,
        })
    }
}
