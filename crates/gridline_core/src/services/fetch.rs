//! Report fetching with cancellation support.
//!
//! One call to [`FetchService::execute`] is one request lifecycle: it races
//! the transport against the handle's cancellation token and always settles
//! to exactly one [`FetchOutcome`]. All failures are folded into the outcome
//! here; nothing propagates past this boundary.

use crate::error::GridlineError;
use crate::models::{FetchHandle, FetchOutcome};
use crate::services::normalize;

use serde_json::Value;
use tokio::select;

/// Seam between the lifecycle manager and the transport, so the controller
/// can be exercised without a network.
pub trait Fetcher: Send + Sync {
    /// Issue a GET for `url` and return the parsed JSON payload.
    fn fetch(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Value, GridlineError>> + Send;
}

/// Production transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher reusing an existing client (connection pooling).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Value, GridlineError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GridlineError::network_with_source("transport error", url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GridlineError::network(
                format!("API server returned {}", status.as_u16()),
                url,
            ));
        }

        response
            .json()
            .await
            .map_err(|e| GridlineError::malformed_with_source("unparsable JSON body", url, e))
    }
}

/// Service for running one report request to completion.
pub struct FetchService;

impl FetchService {
    /// Execute the request described by `handle` against `fetcher`.
    ///
    /// Cancellation observed before the response arrives wins: the payload
    /// is discarded and the outcome is `Cancelled`, never `Failed`. A
    /// non-2xx status or unparsable/schema-violating body becomes `Failed`
    /// with the request URL embedded; a valid payload is classified into
    /// `Loaded` or `Empty`.
    pub async fn execute<F: Fetcher>(fetcher: &F, handle: &FetchHandle) -> FetchOutcome {
        tracing::debug!(
            request_id = %handle.id(),
            generation = handle.generation(),
            url = handle.url(),
            "Fetch started"
        );

        let payload = select! {
            result = fetcher.fetch(handle.url()) => result,
            _ = handle.cancelled() => {
                tracing::debug!(request_id = %handle.id(), "Fetch cancelled in flight");
                return FetchOutcome::Cancelled;
            }
        };

        // Cancel wins ties: a response that raced the cancel is discarded.
        if handle.is_cancelled() {
            tracing::debug!(request_id = %handle.id(), "Response discarded after cancel");
            return FetchOutcome::Cancelled;
        }

        let outcome = match payload.and_then(|json| normalize::classify(&json, handle.url())) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    request_id = %handle.id(),
                    elapsed_ms = handle.elapsed_ms(),
                    error = %err,
                    "Fetch failed"
                );
                return FetchOutcome::Failed(err.to_string());
            }
        };

        tracing::debug!(
            request_id = %handle.id(),
            elapsed_ms = handle.elapsed_ms(),
            row_count = outcome.rows().len(),
            "Fetch completed"
        );
        outcome
    }
}
