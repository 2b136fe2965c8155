//! Blocking HTTP client for the Latitude.sh API.
//!
//! [`Client`] implements [`reconcile::RemoteApi`], so the reconciliation
//! engine can drive real resources through it. Every request carries the
//! bearer token and a `User-Agent` naming this crate.

use std::time::Duration;

use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Body, RequestBuilder};

use reconcile::{ApiResult, Filter, ProviderRequest, RemoteApi, RemoteObject};

use crate::envelope;
use crate::error::{Error, Result};
use crate::retry::{RetryConfig, with_retry};

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.latitude.sh";

/// Token sent when none is configured
///
/// Requests are still attempted; the API answers with an authorization error.
pub const PLACEHOLDER_TOKEN: &str = " ";

/// Default timeout for a whole request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("latitude-provider/", env!("CARGO_PKG_VERSION"));

/// Latitude.sh API client.
///
/// # Example
///
/// ```no_run
/// use latitude::Client;
/// use reconcile::{Filter, RemoteApi};
///
/// let client = Client::new("my-token");
/// let plans = client.list("plans", &Filter::new().with("filter[slug]", "c2-small")).unwrap();
/// println!("Found {} plans", plans.len());
/// ```
pub struct Client {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without trailing slash.
    api_base: String,
    token: String,
    retry: RetryConfig,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_base", &self.api_base)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the public API.
    ///
    /// An empty token is replaced by [`PLACEHOLDER_TOKEN`].
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        let token = if token.trim().is_empty() {
            PLACEHOLDER_TOKEN.to_string()
        } else {
            token
        };

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .http_status_as_error(false)
            .build();

        Self {
            agent: ureq::Agent::new_with_config(config),
            api_base: DEFAULT_API_URL.to_string(),
            token,
            retry: RetryConfig::default(),
        }
    }

    /// Use a different API base (staging, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy for idempotent calls.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get the current API base URL.
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether a real token was configured
    pub fn is_authenticated(&self) -> bool {
        self.token != PLACEHOLDER_TOKEN
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.api_base, collection.trim_matches('/'))
    }

    fn object_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(collection), id)
    }

    /// Read the body of a response, turning error statuses into errors
    fn finish(url: &str, mut response: Response<Body>) -> Result<String> {
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        log::debug!("{url}: HTTP {status}");

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(Error::from_status(status, url, envelope::error_message(&body)))
        }
    }

    fn get_json(&self, url: &str, filter: &Filter) -> Result<String> {
        let mut request = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.api+json")
            .header("Authorization", self.authorization());
        for (key, value) in filter.terms() {
            request = request.query(key, value);
        }
        let response = request.call()?;
        Self::finish(url, response)
    }

    fn send_json(
        &self,
        builder: RequestBuilder<WithBody>,
        url: &str,
        request: &ProviderRequest,
    ) -> Result<String> {
        let body = envelope::request_body(request);
        let response = builder
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.api+json")
            .header("Content-Type", "application/vnd.api+json")
            .header("Authorization", self.authorization())
            .send_json(&body)?;
        Self::finish(url, response)
    }

    /// Fetch one object.
    pub fn fetch(&self, collection: &str, id: &str) -> Result<RemoteObject> {
        let url = self.object_url(collection, id);
        let body = with_retry(&self.retry, &url, || self.get_json(&url, &Filter::new()))?;
        envelope::parse_object(&body)
    }

    /// List a collection with filter terms sent as query parameters.
    pub fn fetch_all(&self, collection: &str, filter: &Filter) -> Result<Vec<RemoteObject>> {
        let url = self.collection_url(collection);
        let body = with_retry(&self.retry, &url, || self.get_json(&url, filter))?;
        envelope::parse_list(&body)
    }

    /// Create an object.
    pub fn post(&self, collection: &str, request: &ProviderRequest) -> Result<RemoteObject> {
        let url = self.collection_url(collection);
        let body = self.send_json(self.agent.post(&url), &url, request)?;
        envelope::parse_object(&body)
    }

    /// Update an object.
    ///
    /// Some endpoints answer an update with an empty body; the caller
    /// re-reads in that case, so an empty attribute set is returned.
    pub fn patch(
        &self,
        collection: &str,
        id: &str,
        request: &ProviderRequest,
    ) -> Result<RemoteObject> {
        let url = self.object_url(collection, id);
        let body = self.send_json(self.agent.patch(&url), &url, request)?;
        if body.trim().is_empty() {
            return Ok(RemoteObject::new(id, serde_json::Map::new()));
        }
        envelope::parse_object(&body)
    }

    /// Delete an object.
    pub fn remove(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.object_url(collection, id);
        with_retry(&self.retry, &url, || {
            let response = self
                .agent
                .delete(&url)
                .header("User-Agent", USER_AGENT)
                .header("Authorization", self.authorization())
                .call()?;
            Self::finish(&url, response).map(|_| ())
        })
    }
}

impl RemoteApi for Client {
    fn create(&self, collection: &str, request: &ProviderRequest) -> ApiResult<RemoteObject> {
        Ok(self.post(collection, request)?)
    }

    fn get(&self, collection: &str, id: &str) -> ApiResult<RemoteObject> {
        Ok(self.fetch(collection, id)?)
    }

    fn update(
        &self,
        collection: &str,
        id: &str,
        request: &ProviderRequest,
    ) -> ApiResult<RemoteObject> {
        Ok(self.patch(collection, id, request)?)
    }

    fn delete(&self, collection: &str, id: &str) -> ApiResult<()> {
        Ok(self.remove(collection, id)?)
    }

    fn list(&self, collection: &str, filter: &Filter) -> ApiResult<Vec<RemoteObject>> {
        Ok(self.fetch_all(collection, filter)?)
    }
}
