//! Remote API client contract
//!
//! The engine never talks HTTP itself. It is handed a [`RemoteApi`]
//! implementation at construction time and calls it with already-encoded
//! requests. Implementations must be safe for concurrent use.

use crate::codec::{ProviderRequest, RemoteObject};

/// Result type for remote API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures reported by a remote API client
///
/// The three outcomes the engine must tell apart are a transport problem,
/// a validation failure reported by the remote service, and a missing object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Could not reach the service, or it failed server-side.
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// Service refused the request as invalid.
    #[error("rejected by remote service (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Target object does not exist.
    #[error("remote object not found")]
    NotFound,

    /// Response could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            status: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Filter terms passed to a list call, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style term
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.terms.push((key.into(), value.into()));
    }

    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Remote API client for one provider
///
/// Every call is addressed by collection path (e.g., `servers`,
/// `virtual_networks/assignments`).
pub trait RemoteApi: Send + Sync {
    /// Create an object; the response carries the assigned identifier.
    fn create(&self, collection: &str, request: &ProviderRequest) -> ApiResult<RemoteObject>;

    /// Fetch an object by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the object does not exist.
    fn get(&self, collection: &str, id: &str) -> ApiResult<RemoteObject>;

    /// Apply the attributes in `request` to an existing object.
    fn update(&self, collection: &str, id: &str, request: &ProviderRequest)
    -> ApiResult<RemoteObject>;

    /// Delete an object.
    fn delete(&self, collection: &str, id: &str) -> ApiResult<()>;

    /// List objects, passing `filter` to the service.
    ///
    /// Services may ignore filter terms; callers re-check results.
    fn list(&self, collection: &str, filter: &Filter) -> ApiResult<Vec<RemoteObject>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_preserves_order() {
        let filter = Filter::new().with("slug", "c2-small").with("site", "sao-paulo");
        assert_eq!(
            filter.terms(),
            &[
                ("slug".to_string(), "c2-small".to_string()),
                ("site".to_string(), "sao-paulo".to_string()),
            ]
        );
        assert!(!filter.is_empty());
        assert!(Filter::new().is_empty());
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected {
            status: 422,
            message: "hostname is invalid".into(),
        };
        assert_eq!(
            err.to_string(),
            "rejected by remote service (HTTP 422): hostname is invalid"
        );
        assert!(ApiError::NotFound.is_not_found());
        assert!(!ApiError::transport("reset").is_not_found());
    }
}
