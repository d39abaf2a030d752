//! Fetch tracking models.

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Handle for tracking and cancelling one in-flight report request.
///
/// Each handle owns a fresh [`CancellationToken`]; a fired token is never
/// reused, so a stale cancel can never reach a later request. The generation
/// ties the handle to the controller state it was issued under.
pub struct FetchHandle {
    /// Unique request identifier
    id: Uuid,
    /// Generation this request belongs to
    generation: u64,
    /// The composed request URL
    url: String,
    /// Cancellation token for interrupting the request
    cancel_token: CancellationToken,
    /// Request start time
    started_at: DateTime<Utc>,
}

impl FetchHandle {
    /// Create a new fetch handle.
    pub fn new(generation: u64, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            generation,
            url: url.into(),
            cancel_token: CancellationToken::new(),
            started_at: Utc::now(),
        }
    }

    /// Get the unique request identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the generation this request was issued under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get the composed request URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get when the request started.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        tracing::debug!(request_id = %self.id, "Cancellation requested");
        self.cancel_token.cancel();
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Wait for cancellation.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }
}

impl std::fmt::Debug for FetchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchHandle")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("url", &self.url)
            .field("started_at", &self.started_at)
            .field("is_cancelled", &self.is_cancelled())
            .finish()
    }
}
