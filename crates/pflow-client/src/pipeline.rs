//! The request pipeline.
//!
//! Every API call goes through [`RequestPipeline`]. The outbound phase runs
//! synchronously before dispatch and attaches the current bearer token. The
//! inbound phase runs exactly once per call, in that call's own
//! continuation, and turns the response into either the envelope's `data`
//! or a classified [`ApiError`].
//!
//! Binary transfers use [`RequestPipeline::send_raw`], which skips the
//! inbound phase entirely and hands back the transport result untouched.
//!
//! Responses are not ordered across calls and in-flight calls are never
//! cancelled. The session generation captured at dispatch keeps a late 401
//! from ending a session that was established after the call went out.

use std::sync::Arc;

use pflow_core::{Navigator, Notifier};
use pflow_store::SessionStore;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::{ApiError, Result};

/// A single API call, described independently of the transport.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    /// A request with no query and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// A `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// A `PUT` request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// A `DELETE` request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Encode` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    /// The request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The request path, relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Wraps every API call with credential attachment and response handling.
pub struct RequestPipeline {
    client: Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl RequestPipeline {
    /// Create a pipeline with an HTTP client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Request` if the HTTP client cannot be created.
    pub fn new(
        config: ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self::with_client(client, config, session, navigator, notifier))
    }

    /// Create a pipeline with a custom reqwest client.
    #[must_use]
    pub fn with_client(
        client: Client,
        config: ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            config,
            session,
            navigator,
            notifier,
        }
    }

    /// The configuration this pipeline was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The session store credentials are read from.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// The navigator forced redirects are sent to.
    #[must_use]
    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    // =========================================================================
    // Envelope calls
    // =========================================================================

    /// `GET path` and return the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body and return the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    /// `PUT path` with a JSON body and return the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    /// `DELETE path` and return the envelope's `data`.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Dispatch `request` and unwrap the response envelope.
    ///
    /// # Errors
    ///
    /// Construction failures are returned unchanged. Every other failure is
    /// classified, shown through the notifier and returned; authentication
    /// failures also end the session and redirect to the login route.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let (http_request, generation) = self.outbound(&request)?;
        let result = self.client.execute(http_request).await;
        self.inbound(&request, generation, result).await
    }

    // =========================================================================
    // Binary calls
    // =========================================================================

    /// Dispatch a binary transfer.
    ///
    /// Credentials are attached as usual, but the response (or transport
    /// error) is returned as-is: no envelope is read, no message is shown and
    /// the session is never touched.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn send_raw(&self, request: ApiRequest) -> reqwest::Result<Response> {
        let (builder, _) = self.request_builder(&request);
        tracing::debug!(method = %request.method, path = %request.path, "Dispatching binary request");
        builder.send().await
    }

    /// `GET path` as a binary transfer.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn download(&self, path: &str) -> reqwest::Result<Response> {
        self.send_raw(ApiRequest::get(path)).await
    }

    // =========================================================================
    // Phases
    // =========================================================================

    /// Build the HTTP request and capture the session generation it belongs
    /// to. Never suspends and never mutates the session.
    fn outbound(&self, request: &ApiRequest) -> Result<(reqwest::Request, u64)> {
        let (builder, generation) = self.request_builder(request);
        let http_request = builder.build().map_err(|e| {
            tracing::warn!(path = %request.path, error = %e, "Failed to build request");
            ApiError::Request(e)
        })?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            generation,
            "Dispatching request"
        );
        Ok((http_request, generation))
    }

    /// Start a reqwest builder for `request` carrying the current token.
    fn request_builder(&self, request: &ApiRequest) -> (RequestBuilder, u64) {
        let (token, generation) = self.session.credentials();

        let mut builder = self
            .client
            .request(request.method.clone(), self.config.endpoint(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        (builder, generation)
    }

    async fn inbound<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        generation: u64,
        result: reqwest::Result<Response>,
    ) -> Result<T> {
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Request failed without a response");
                return Err(self.reject(ApiError::from_transport(e), generation));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            tracing::warn!(path = %request.path, status = %status, "Request rejected");
            return Err(self.reject(ApiError::from_status(status, body), generation));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.reject(ApiError::from_transport(e), generation)),
        };

        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(path = %request.path, error = %e, "Response is not an envelope");
                return Err(self.reject(ApiError::from_decode(e), generation));
            }
        };

        if !envelope.is_success() {
            tracing::warn!(
                path = %request.path,
                code = envelope.code,
                message = %envelope.message,
                "Envelope reported failure"
            );
            let err = ApiError::from_envelope(envelope.code, &envelope.message);
            return Err(self.reject(err, generation));
        }

        serde_json::from_value(envelope.data).map_err(|e| {
            tracing::warn!(path = %request.path, error = %e, "Unexpected envelope data");
            self.reject(ApiError::from_decode(e), generation)
        })
    }

    /// Apply the side effects of a failed call and hand the error back.
    fn reject(&self, err: ApiError, generation: u64) -> ApiError {
        if err.is_authentication() {
            self.end_session(generation, &err.to_string());
        } else {
            self.notifier.error(&err.to_string());
        }
        err
    }

    /// Soft authentication failure: clear the session, tell the user and go
    /// to the login route. A failure that belongs to a superseded session
    /// only gets rejected.
    fn end_session(&self, generation: u64, message: &str) {
        match self.session.clear_if_current(generation) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(generation, "Ignoring authentication failure from a superseded session");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear session after authentication failure");
            }
        }

        self.notifier.error(message);
        self.navigator.go_to(&self.config.login_path);
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.config.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}
