//! A [`RelayApi`] implementation that talks to a remote gas-free relay over HTTP.
//!
//! [`HttpRelayClient`] covers the five relay endpoints:
//!
//! | Method | Path                                    |
//! |--------|-----------------------------------------|
//! | GET    | `/{network}/api/v1/config/token/all`    |
//! | GET    | `/{network}/api/v1/config/provider/all` |
//! | GET    | `/{network}/api/v1/address/{user}`      |
//! | POST   | `/{network}/api/v1/gasfree/submit`      |
//! | GET    | `/{network}/api/v1/gasfree/{traceId}`   |
//!
//! The relay reports failures inside its JSON envelope, sometimes with a
//! non-2xx HTTP status. Any body that parses as an envelope is interpreted
//! through [`ApiResponse::into_data`]; only bodies that do not parse become
//! [`RelayError::HttpStatus`].

use std::time::Duration;

use gasfree::proto::{
    AccountSnapshot, ApiResponse, ProviderList, ServiceProvider, SubmitReceipt, SubmitRequest,
    TokenConfig, TokenList, TransferStatus,
};
use gasfree::relay::{BoxFuture, RelayApi};
use gasfree::{GasFreeError, NetworkConfig, TronAddress, UnixTimestamp};
use reqwest::{Client, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::Instrument;

use crate::auth::AuthProvider;
use crate::error::RelayError;

/// Version prefix of every relay endpoint.
pub const API_PREFIX: &str = "api/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for [`HttpRelayClient`].
pub struct RelayConfig {
    /// Relay base URL (scheme and host, e.g. `https://open-test.gasfree.io`).
    pub base_url: String,

    /// Network path segment (`nile`, `tron`).
    pub network: String,

    /// HTTP request timeout.
    pub timeout: Duration,

    /// Optional authentication provider.
    pub auth_provider: Option<Box<dyn AuthProvider>>,

    /// Optional pre-configured reqwest client. If `None`, a new client is
    /// created with the configured timeout.
    pub http_client: Option<Client>,
}

impl RelayConfig {
    /// Creates a config for a relay at `base_url` serving `network`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            network: network.into(),
            timeout: DEFAULT_TIMEOUT,
            auth_provider: None,
            http_client: None,
        }
    }

    /// Creates a config for the public relay of a built-in deployment.
    #[must_use]
    pub fn for_network(network: &NetworkConfig) -> Self {
        Self::new(network.relay_base_url, network.name)
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the authentication provider.
    #[must_use]
    pub fn with_auth(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Box::new(provider));
        self
    }

    /// Sets a pre-configured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("base_url", &self.base_url)
            .field("network", &self.network)
            .field("timeout", &self.timeout)
            .field("has_auth_provider", &self.auth_provider.is_some())
            .field("has_http_client", &self.http_client.is_some())
            .finish()
    }
}

/// Async HTTP client for the gas-free relay.
///
/// # Example
///
/// ```no_run
/// use gasfree::NetworkConfig;
/// use gasfree_http::{ApiKeyAuth, HttpRelayClient, RelayConfig};
///
/// let config = RelayConfig::for_network(&NetworkConfig::nile())
///     .with_auth(ApiKeyAuth::new("key", "secret"));
/// let relay = HttpRelayClient::new(config)?;
/// # Ok::<(), gasfree_http::RelayError>(())
/// ```
pub struct HttpRelayClient {
    base_url: Url,
    network: String,
    auth_provider: Option<Box<dyn AuthProvider>>,
    client: Client,
}

impl HttpRelayClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UrlParse`] for an invalid base URL and
    /// [`RelayError::Http`] if the HTTP client cannot be built.
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = config.base_url.trim_end_matches('/').to_owned();
        normalized.push('/');
        let base_url = Url::parse(&normalized).map_err(|source| RelayError::UrlParse {
            context: "Failed to parse relay base url",
            source,
        })?;

        let client = match config.http_client {
            Some(client) => client,
            None => Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|source| RelayError::Http {
                    context: "Failed to build HTTP client",
                    source,
                })?,
        };

        Ok(Self {
            base_url,
            network: config.network.trim_matches('/').to_owned(),
            auth_provider: config.auth_provider,
            client,
        })
    }

    /// Returns the relay base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the network path segment.
    #[must_use]
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Returns the signed path of an endpoint, e.g. `/nile/api/v1/config/token/all`.
    #[must_use]
    pub fn full_path(&self, endpoint: &str) -> String {
        format!("/{}/{API_PREFIX}/{}", self.network, endpoint.trim_start_matches('/'))
    }

    /// Sends one authenticated request and decodes the relay envelope with `decode`.
    ///
    /// `context` is a human-readable identifier used in tracing and error
    /// messages (e.g. `"GET /config/token/all"`).
    async fn call<T, R, B>(
        &self,
        method: Method,
        endpoint: &str,
        context: &'static str,
        body: Option<&B>,
        decode: fn(ApiResponse<T>) -> Result<R, GasFreeError>,
    ) -> Result<R, RelayError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let fut = async {
            let envelope = self.send_call::<T, B>(method, endpoint, context, body).await?;
            decode(envelope).map_err(RelayError::from)
        };
        #[cfg(feature = "telemetry")]
        let fut = fut.instrument(tracing::info_span!("gasfree.relay", endpoint = context));
        let result = fut.await;
        record_result(context, &result);
        result
    }

    async fn send_call<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        context: &'static str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, RelayError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let full_path = self.full_path(endpoint);
        let url = self
            .base_url
            .join(full_path.trim_start_matches('/'))
            .map_err(|source| RelayError::UrlParse { context, source })?;

        let mut req = self.client.request(method.clone(), url);
        if let Some(auth) = &self.auth_provider {
            req = req.headers(auth.auth_headers(&method, &full_path, UnixTimestamp::now())?);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let http_response = req
            .send()
            .await
            .map_err(|source| RelayError::Http { context, source })?;
        let status = http_response.status();
        let text = http_response
            .text()
            .await
            .map_err(|source| RelayError::ResponseBodyRead { context, source })?;

        match serde_json::from_str::<ApiResponse<T>>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(RelayError::HttpStatus {
                context,
                status,
                body: text,
            }),
            Err(source) => Err(RelayError::JsonDeserialization { context, source }),
        }
    }

    /// GETs an endpoint whose payload may legitimately be absent.
    async fn get_optional<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        context: &'static str,
    ) -> Result<Option<T>, RelayError> {
        self.call::<T, _, ()>(Method::GET, endpoint, context, None, ApiResponse::into_data)
            .await
    }

    /// GETs an endpoint that must return a payload.
    async fn get_required<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        context: &'static str,
    ) -> Result<T, RelayError> {
        self.call::<T, _, ()>(Method::GET, endpoint, context, None, ApiResponse::into_required)
            .await
    }
}

impl std::fmt::Debug for HttpRelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRelayClient")
            .field("base_url", &self.base_url.as_str())
            .field("network", &self.network)
            .field("has_auth_provider", &self.auth_provider.is_some())
            .finish_non_exhaustive()
    }
}

impl RelayApi for HttpRelayClient {
    type Error = RelayError;

    fn tokens(&self) -> BoxFuture<'_, Result<Vec<TokenConfig>, RelayError>> {
        Box::pin(async move {
            let list: TokenList = self
                .get_required("config/token/all", "GET /config/token/all")
                .await?;
            Ok(list.tokens)
        })
    }

    fn providers(&self) -> BoxFuture<'_, Result<Vec<ServiceProvider>, RelayError>> {
        Box::pin(async move {
            let list: ProviderList = self
                .get_required("config/provider/all", "GET /config/provider/all")
                .await?;
            Ok(list.providers)
        })
    }

    fn account<'a>(
        &'a self,
        user: &'a TronAddress,
    ) -> BoxFuture<'a, Result<AccountSnapshot, RelayError>> {
        Box::pin(async move {
            let endpoint = format!("address/{}", user.to_base58());
            self.get_required(&endpoint, "GET /address/{user}").await
        })
    }

    fn submit<'a>(
        &'a self,
        request: &'a SubmitRequest,
    ) -> BoxFuture<'a, Result<SubmitReceipt, RelayError>> {
        Box::pin(async move {
            self.call(
                Method::POST,
                "gasfree/submit",
                "POST /gasfree/submit",
                Some(request),
                ApiResponse::into_required,
            )
            .await
        })
    }

    fn transfer_status<'a>(
        &'a self,
        trace_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<TransferStatus>, RelayError>> {
        Box::pin(async move {
            let endpoint = format!("gasfree/{}", trace_id.trim());
            self.get_optional(&endpoint, "GET /gasfree/{traceId}").await
        })
    }
}

/// Logs the outcome of a relay request.
#[cfg(feature = "telemetry")]
fn record_result<R>(context: &'static str, result: &Result<R, RelayError>) {
    match result {
        Ok(_) => tracing::debug!(endpoint = context, "relay request succeeded"),
        Err(err) => tracing::warn!(endpoint = context, error = %err, "relay request failed"),
    }
}

/// Logs the outcome of a relay request.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result<R>(_context: &'static str, _result: &Result<R, RelayError>) {}
