//! Error types for Latitude.sh API calls.
//!
//! Errors are categorized so the client can decide what to retry and so the
//! reconciliation engine can tell a rejected request from a missing object.

use std::fmt;

use reconcile::ApiError;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection problems and server-side failures (transient, retryable).
    Network,
    /// The API refused the request as invalid or unauthorized.
    Rejected,
    /// The requested object does not exist.
    NotFound,
    /// The response body could not be understood.
    Format,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Rejected => "Request rejected by the API",
            Self::NotFound => "Object not found",
            Self::Format => "Invalid API response",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::Rejected => "Check the auth token and the request values",
            Self::NotFound => "The object may have been deleted outside this tool",
            Self::Format => "The API may have changed, try upgrading",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the Latitude.sh API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed before a usable response arrived, or with a
    /// server-side status.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The API rejected the request (validation, auth, conflict).
    #[error("API rejected request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// The API answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// Requested URL.
        url: String,
    },

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Classify a non-success status code
    ///
    /// 404 is not found; 400, 401, 403, 409 and 422 are rejections; anything
    /// else (5xx, 429, unexpected codes) is treated as a transport failure.
    pub fn from_status(status: u16, url: &str, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("HTTP {status}"));
        match status {
            404 => Self::NotFound {
                url: url.to_string(),
            },
            400 | 401 | 403 | 409 | 422 => Self::Rejected { status, message },
            _ => Self::Http {
                message,
                status: Some(status),
            },
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } => ErrorCategory::Network,
            Self::Rejected { .. } => ErrorCategory::Rejected,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidResponse(_) => ErrorCategory::Format,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::http(format!("HTTP {code}"), Some(code)),
            other => Self::http(other.to_string(), None),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Http { message, status } => Self::Transport { message, status },
            Error::Rejected { status, message } => Self::Rejected { status, message },
            Error::NotFound { .. } => Self::NotFound,
            Error::InvalidResponse(message) => Self::Malformed(message),
        }
    }
}
