//! Error types for the Gridline controller core.
//!
//! Every fetch-related failure is converted into a [`GridlineError`] at the
//! fetch boundary and then folded into a `FetchOutcome`; errors never unwind
//! across the controller surface.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the controller core.
#[derive(Debug, Error)]
pub enum GridlineError {
    /// Transport failure or non-2xx HTTP status.
    #[error("API call failed: {url}: {message}")]
    Network {
        /// Human-readable error message.
        message: String,
        /// The request URL that failed.
        url: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// 2xx response whose body is unparsable or schema-violating.
    #[error("malformed response from {url}: {message}")]
    MalformedResponse {
        /// Human-readable error message.
        message: String,
        /// The request URL that produced the payload.
        url: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request was cancelled by the user.
    #[error("request cancelled")]
    Cancelled {
        /// ID of the cancelled request.
        request_id: Uuid,
    },

    /// QueryState failed validation before a request could be composed.
    #[error("invalid query: {message}")]
    InvalidQuery {
        /// Human-readable error message.
        message: String,
    },

    /// Bad endpoint or base URL configuration.
    #[error("config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },
}

impl GridlineError {
    // ========== Constructors ==========

    /// Create a new network error.
    pub fn network(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Network { message: message.into(), url: url.into(), source: None }
    }

    /// Create a new network error with source.
    pub fn network_with_source(
        message: impl Into<String>,
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network { message: message.into(), url: url.into(), source: Some(Box::new(source)) }
    }

    /// Create a new malformed-response error.
    pub fn malformed(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into(), url: url.into(), source: None }
    }

    /// Create a new malformed-response error with source.
    pub fn malformed_with_source(
        message: impl Into<String>,
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::MalformedResponse {
            message: message.into(),
            url: url.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a cancelled error for the given request.
    pub fn cancelled(request_id: Uuid) -> Self {
        Self::Cancelled { request_id }
    }

    /// Create a new invalid-query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery { message: message.into() }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    // ========== Methods ==========

    /// Check if this error represents a cancelled request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network { .. } => "Network",
            Self::MalformedResponse { .. } => "Response",
            Self::Cancelled { .. } => "Cancelled",
            Self::InvalidQuery { .. } => "Query",
            Self::Config { .. } => "Config",
        }
    }

    /// Get the failed request URL, if this error carries one.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Network { url, .. } | Self::MalformedResponse { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Network { .. } => Some("Reload the page to retry"),
            Self::MalformedResponse { .. } => Some("The API server may be mid-deploy; retry later"),
            Self::Cancelled { .. } => Some("Start over to run the query again"),
            Self::InvalidQuery { .. } => Some("Remove the offending filter and retry"),
            Self::Config { .. } => None,
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = format!("{} Error", self.category());
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::Network { source, .. } | Self::MalformedResponse { source, .. } => {
                source.as_ref().map(|s| s.to_string())
            }
            Self::Cancelled { request_id } => Some(format!("Request: {request_id}")),
            _ => None,
        };

        ErrorInfo { error_type, message, hint, technical_detail }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Network Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

/// Convert from url::ParseError to GridlineError.
impl From<url::ParseError> for GridlineError {
    fn from(err: url::ParseError) -> Self {
        GridlineError::Config { message: format!("invalid URL: {err}") }
    }
}
