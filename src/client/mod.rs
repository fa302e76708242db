//! The HTTP client and request execution engine.
//!
//! [`Client`] owns a connection pool, the shop's base URL, credentials, and
//! the retry policy. Every REST and GraphQL call funnels through the same
//! execution loop, which classifies responses, honors rate-limit waits, and
//! records the shop's rate-limit state.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_admin::{ApiVersion, Client, ShopDomain};
//!
//! let client = Client::builder(ShopDomain::new("fooshop")?)
//!     .access_token("shpat_...")
//!     .api_version(ApiVersion::release("2024-01")?)
//!     .retries(3)
//!     .build();
//!
//! let shop = client.shop().get().await?;
//! ```

mod errors;
mod pagination;
mod rate_limit;
mod request;
mod response;

pub use errors::{
    ClientError, RateLimitError, RequestBuildError, ResponseDecodingError, ResponseError,
};
pub use pagination::{PageOptions, Pagination};
pub use rate_limit::RateLimitInfo;

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, LINK, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{ApiVersion, ShopDomain};
use crate::graphql::GraphqlCost;

const DEFAULT_USER_AGENT: &str = concat!("shopify-admin/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_LOG_BODY_BYTES: usize = 1024;
const VERSION_HEADER: &str = "X-Shopify-API-Version";
const REQUEST_ID_HEADER: &str = "X-Shopify-Request-Id";

/// A boxed sleep in progress.
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Produces the delay future used between retry attempts. The default wraps
/// [`tokio::time::sleep`]; tests substitute a recording no-op, and callers
/// who need cancellation can supply a sleeper that races a shutdown signal.
pub type Sleeper = Arc<dyn Fn(Duration) -> SleepFuture + Send + Sync>;

fn default_sleeper() -> Sleeper {
    Arc::new(|duration| Box::pin(tokio::time::sleep(duration)))
}

/// Credentials attached to every request.
#[derive(Debug, Clone)]
enum Auth {
    /// Private or custom app access token, sent as `X-Shopify-Access-Token`.
    AccessToken(String),
    /// API key and password, sent as HTTP basic auth.
    Basic { api_key: String, password: String },
}

/// A raw executed response, before decoding.
pub(crate) struct Executed {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    /// Attempts consumed, including the successful one. GraphQL cost-aware
    /// retries fold this into their own budget.
    pub attempts: u32,
}

#[derive(Deserialize)]
struct CountEnvelope {
    count: u64,
}

/// Admin API client for a single shop.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    path_prefix: String,
    api_version: ApiVersion,
    auth: Option<Auth>,
    retries: u32,
    max_log_body_bytes: usize,
    sleeper: Sleeper,
    rate_limits: Mutex<RateLimitInfo>,
    negotiated_version: OnceLock<String>,
}

/// Configures and constructs a [`Client`].
pub struct ClientBuilder {
    shop: ShopDomain,
    base_url: Option<Url>,
    api_version: ApiVersion,
    auth: Option<Auth>,
    retries: u32,
    max_log_body_bytes: usize,
    sleeper: Sleeper,
    timeout: Duration,
}

impl ClientBuilder {
    fn new(shop: ShopDomain) -> Self {
        Self {
            shop,
            base_url: None,
            api_version: ApiVersion::default(),
            auth: None,
            retries: 1,
            max_log_body_bytes: DEFAULT_MAX_LOG_BODY_BYTES,
            sleeper: default_sleeper(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Authenticate with a private or custom app access token.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(Auth::AccessToken(token.into()));
        self
    }

    /// Authenticate with an API key and password.
    #[must_use]
    pub fn basic_auth(mut self, api_key: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(Auth::Basic {
            api_key: api_key.into(),
            password: password.into(),
        });
        self
    }

    /// Pin a specific API version. Unpinned clients use the shop's stable
    /// version and learn the concrete version from the first response.
    #[must_use]
    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = version;
        self
    }

    /// Total attempt budget per call. The default of 1 disables retries;
    /// a budget of 3 allows up to two retries on rate-limit or 503
    /// responses.
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Cap on response body bytes written to debug logs.
    #[must_use]
    pub fn max_log_body_bytes(mut self, bytes: usize) -> Self {
        self.max_log_body_bytes = bytes;
        self
    }

    /// Replace the delay function used between retry attempts.
    #[must_use]
    pub fn sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Request timeout for each attempt.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the base URL derived from the shop domain. Intended for
    /// tests and local proxies.
    #[must_use]
    pub fn base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Construct the client.
    ///
    /// # Panics
    ///
    /// Panics if the underlying TLS backend cannot be initialized.
    #[must_use]
    pub fn build(self) -> Client {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.timeout)
            .build()
            .expect("reqwest client construction with rustls cannot fail");

        Client {
            http,
            base_url: self.base_url.unwrap_or_else(|| self.shop.base_url()),
            path_prefix: self.api_version.path_prefix(),
            api_version: self.api_version,
            auth: self.auth,
            retries: self.retries,
            max_log_body_bytes: self.max_log_body_bytes,
            sleeper: self.sleeper,
            rate_limits: Mutex::new(RateLimitInfo::default()),
            negotiated_version: OnceLock::new(),
        }
    }
}

impl Client {
    /// Start configuring a client for the given shop.
    #[must_use]
    pub fn builder(shop: ShopDomain) -> ClientBuilder {
        ClientBuilder::new(shop)
    }

    /// The API version in effect: the negotiated version once a response has
    /// reported one, otherwise the configured version.
    #[must_use]
    pub fn api_version(&self) -> String {
        self.negotiated_version
            .get()
            .cloned()
            .unwrap_or_else(|| self.api_version.to_string())
    }

    /// Snapshot of the shop's rate-limit state as of the last successful
    /// call.
    #[must_use]
    pub fn rate_limits(&self) -> RateLimitInfo {
        self.lock_rate_limits().clone()
    }

    /// Total attempt budget per call.
    #[must_use]
    pub(crate) const fn retry_budget(&self) -> u32 {
        self.retries
    }

    /// Wait using the configured delay function.
    pub(crate) async fn sleep(&self, duration: Duration) {
        (self.sleeper)(duration).await;
    }

    /// Record a GraphQL cost extension into the shared snapshot, including
    /// the cost-derived wait so backoff decisions made from the snapshot see
    /// it.
    pub(crate) fn record_graphql_cost(&self, cost: GraphqlCost) {
        let mut limits = self.lock_rate_limits();
        limits.retry_after_seconds = cost.retry_after_seconds();
        limits.graphql_cost = Some(cost);
    }

    fn lock_rate_limits(&self) -> std::sync::MutexGuard<'_, RateLimitInfo> {
        // A poisoned snapshot is still a usable snapshot.
        self.rate_limits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// GET a resource and decode the JSON response.
    pub async fn get<T, O>(&self, path: &str, options: Option<&O>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        O: Serialize + ?Sized,
    {
        let executed = self
            .create_and_send::<(), O>(Method::GET, path, None, options)
            .await?;
        self.decode(&executed)
    }

    /// GET a listing and its pagination cursors from the `Link` header.
    pub async fn list_with_pagination<T, O>(
        &self,
        path: &str,
        options: Option<&O>,
    ) -> Result<(T, Pagination), ClientError>
    where
        T: DeserializeOwned,
        O: Serialize + ?Sized,
    {
        let executed = self
            .create_and_send::<(), O>(Method::GET, path, None, options)
            .await?;
        let decoded = self.decode(&executed)?;
        let link = executed
            .headers
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let pagination = pagination::extract_pagination(link)?;
        Ok((decoded, pagination))
    }

    /// GET a count endpoint and return the count.
    pub async fn count<O>(&self, path: &str, options: Option<&O>) -> Result<u64, ClientError>
    where
        O: Serialize + ?Sized,
    {
        let envelope: CountEnvelope = self.get(path, options).await?;
        Ok(envelope.count)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let executed = self
            .create_and_send::<B, ()>(Method::POST, path, Some(body), None)
            .await?;
        self.decode(&executed)
    }

    /// PUT a JSON body and decode the JSON response.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let executed = self
            .create_and_send::<B, ()>(Method::PUT, path, Some(body), None)
            .await?;
        self.decode(&executed)
    }

    /// DELETE a resource, discarding any response body.
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.create_and_send::<(), ()>(Method::DELETE, path, None, None)
            .await?;
        Ok(())
    }

    /// DELETE a resource with query options, discarding any response body.
    pub async fn delete_with_options<O>(&self, path: &str, options: &O) -> Result<(), ClientError>
    where
        O: Serialize + ?Sized,
    {
        self.create_and_send::<(), O>(Method::DELETE, path, None, Some(options))
            .await?;
        Ok(())
    }

    /// Build and execute a request under the versioned path prefix.
    pub(crate) async fn create_and_send<B, O>(
        &self,
        method: Method,
        rel_path: &str,
        body: Option<&B>,
        options: Option<&O>,
    ) -> Result<Executed, ClientError>
    where
        B: Serialize + ?Sized,
        O: Serialize + ?Sized,
    {
        let prefixed = format!("{}/{}", self.path_prefix, rel_path.trim_start_matches('/'));
        self.send_unprefixed(method, &prefixed, body, options).await
    }

    /// Build and execute a request against the bare shop base URL, skipping
    /// the versioned prefix. OAuth endpoints live outside the prefix.
    pub(crate) async fn send_unprefixed<B, O>(
        &self,
        method: Method,
        rel_path: &str,
        body: Option<&B>,
        options: Option<&O>,
    ) -> Result<Executed, ClientError>
    where
        B: Serialize + ?Sized,
        O: Serialize + ?Sized,
    {
        let built = request::build_request(&self.base_url, method, rel_path, body, options)?;
        self.execute(built).await
    }

    /// The retry loop. Rate-limit responses sleep the advertised wait and
    /// retry; 503 responses retry immediately; everything else is fatal.
    /// Each retry consumes one unit of the attempt budget, and a budget of
    /// one or less makes every error fatal.
    async fn execute(&self, built: request::BuiltRequest) -> Result<Executed, ClientError> {
        let mut budget = self.retries;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let executed = self.send_once(&built).await?;

            match response::check_response_error(executed.status, &executed.headers, &executed.body)
            {
                Ok(()) => {
                    self.lock_rate_limits().update_from_headers(&executed.headers);
                    self.latch_api_version(&executed.headers);
                    return Ok(Executed { attempts, ..executed });
                }
                Err(ClientError::RateLimit(e)) if budget > 1 => {
                    budget -= 1;
                    tracing::warn!(
                        retry_after = e.retry_after,
                        "rate limited, waiting before retry"
                    );
                    (self.sleeper)(Duration::from_secs(e.retry_after)).await;
                }
                Err(ClientError::Api(e)) if e.status == 503 && budget > 1 => {
                    budget -= 1;
                    tracing::warn!("service unavailable, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send the buffered request a single time. The body bytes are cloned
    /// from the build, so every attempt sends identical content.
    async fn send_once(&self, built: &request::BuiltRequest) -> Result<Executed, ClientError> {
        tracing::debug!("{}: {}", built.method, built.url);

        let mut req = self
            .http
            .request(built.method.clone(), built.url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, DEFAULT_USER_AGENT);

        match &self.auth {
            Some(Auth::AccessToken(token)) => {
                req = req.header("X-Shopify-Access-Token", token);
            }
            Some(Auth::Basic { api_key, password }) => {
                req = req.basic_auth(api_key, Some(password));
            }
            None => {}
        }

        if let Some(body) = &built.body {
            self.log_body("SENT", body);
            req = req.body(body.clone());
        }

        let resp = req.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await?.to_vec();

        tracing::debug!(
            "RECV {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        );
        if let Some(request_id) = headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
            tracing::debug!("Shopify X-Request-Id: {request_id}");
        }
        self.log_body("RESP", &body);

        Ok(Executed {
            status: status.as_u16(),
            headers,
            body,
            attempts: 1,
        })
    }

    /// Record the concrete version the shop is serving when the client was
    /// not pinned to one. Latches once per client.
    fn latch_api_version(&self, headers: &HeaderMap) {
        if !self.api_version.is_stable() {
            return;
        }
        if let Some(version) = headers.get(VERSION_HEADER).and_then(|v| v.to_str().ok()) {
            if self.negotiated_version.set(version.to_string()).is_ok() {
                tracing::info!("api version not pinned, now using {version}");
            }
        }
    }

    /// Decode an executed response body into `T`.
    pub(crate) fn decode<T: DeserializeOwned>(&self, executed: &Executed) -> Result<T, ClientError> {
        serde_json::from_slice(&executed.body).map_err(|e| {
            ResponseDecodingError {
                body: executed.body.clone(),
                message: e.to_string(),
                status: executed.status,
            }
            .into()
        })
    }

    fn log_body(&self, direction: &str, body: &[u8]) {
        if body.is_empty() {
            return;
        }
        let shown = &body[..body.len().min(self.max_log_body_bytes)];
        tracing::debug!("{direction}: {}", String::from_utf8_lossy(shown));
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::builder(ShopDomain::new("fooshop").unwrap())
            .access_token("token")
            .build()
    }

    #[test]
    fn test_stable_client_uses_admin_prefix() {
        let c = client();
        assert_eq!(c.path_prefix, "admin");
        assert_eq!(c.api_version(), "stable");
    }

    #[test]
    fn test_pinned_client_uses_versioned_prefix() {
        let c = Client::builder(ShopDomain::new("fooshop").unwrap())
            .api_version(ApiVersion::release("2024-01").unwrap())
            .build();
        assert_eq!(c.path_prefix, "admin/api/2024-01");
        assert_eq!(c.api_version(), "2024-01");
    }

    #[test]
    fn test_version_latch_only_sets_once() {
        let c = client();
        let mut headers = HeaderMap::new();
        headers.insert(VERSION_HEADER, "2024-01".parse().unwrap());
        c.latch_api_version(&headers);
        assert_eq!(c.api_version(), "2024-01");

        headers.insert(VERSION_HEADER, "2024-04".parse().unwrap());
        c.latch_api_version(&headers);
        assert_eq!(c.api_version(), "2024-01");
    }

    #[test]
    fn test_pinned_client_never_latches() {
        let c = Client::builder(ShopDomain::new("fooshop").unwrap())
            .api_version(ApiVersion::release("2024-01").unwrap())
            .build();
        let mut headers = HeaderMap::new();
        headers.insert(VERSION_HEADER, "2024-07".parse().unwrap());
        c.latch_api_version(&headers);
        assert_eq!(c.api_version(), "2024-01");
    }

    #[test]
    fn test_decode_error_carries_body_and_status() {
        let c = client();
        let executed = Executed {
            status: 200,
            headers: HeaderMap::new(),
            body: b"not json".to_vec(),
            attempts: 1,
        };
        let err = c.decode::<serde_json::Value>(&executed).unwrap_err();
        let ClientError::Decoding(decoding) = err else {
            panic!("expected Decoding error");
        };
        assert_eq!(decoding.body, b"not json");
        assert_eq!(decoding.status, 200);
    }
}
