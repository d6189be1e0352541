use reqwest::Method;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

use crate::blocking_namespaces::{
    Agents, Cron, Events, Fs, Integrations, Marketplace, Orgs, Plugins, System, Templates,
    Triggers, Webhooks,
};
use crate::events::{BlockingEventStream, EVENTS_PATH, SseDecoder, filter_query};
use crate::operations::{self, ApiRequest, OperationDefinition};
use crate::params::Credentials;
use crate::response::{normalize_body, request_failed};
use crate::session::Session;
use crate::{ClientConfig, ClientError};

/// Blocking client for the Aether OS REST API.
///
/// This is the synchronous counterpart of [`crate::AetherClient`]. It must not
/// be used from inside an async runtime.
#[derive(Debug)]
pub struct BlockingAetherClient {
    session: Session,
    http: reqwest::blocking::Client,
    stream_http: reqwest::blocking::Client,
}

impl BlockingAetherClient {
    /// Creates a client with default settings for the given base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::new(base_url.as_ref()))
    }

    /// Creates a client from explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        // The blocking builder defaults to a 30 s timeout; `None` lifts it.
        let stream_http = reqwest::blocking::Client::builder()
            .timeout(config.stream_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            session: Session::new(&config.base_url, config.token)?,
            http,
            stream_http,
        })
    }

    /// Returns the client with a bearer token attached to all requests.
    ///
    /// This sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.session.set_token(Some(token.into()));
        self
    }

    /// Base URL with trailing slashes stripped.
    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// The bearer token currently attached to requests.
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Replaces the bearer token for subsequent requests.
    pub fn set_token(&self, token: impl Into<String>) {
        self.session.set_token(Some(token.into()));
    }

    /// Stops sending an `Authorization` header.
    pub fn clear_token(&self) {
        self.session.set_token(None);
    }

    /// Ends every event stream opened through this client.
    ///
    /// A stream blocked on a read notices on its next line.
    pub fn close(&self) {
        self.session.close();
    }

    /// Exchanges credentials for a token via `POST /api/auth/login`.
    ///
    /// On success the returned token is stored for subsequent requests and the
    /// full response is returned unchanged.
    pub fn login(&self, username: &str, password: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&operations::LOGIN).json(&Credentials { username, password })?;
        let result = self.execute(request)?;
        self.session.store_login_token(&result);
        Ok(result)
    }

    /// Returns every operation in the endpoint catalog.
    pub fn operations() -> &'static [OperationDefinition] {
        operations::OPERATIONS
    }

    /// Sends a catalog request built with [`ApiRequest`].
    pub fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let (method, path, query, body) = request.into_parts()?;
        self.send(method, &path, query.as_slice(), body)
    }

    /// Calls an endpoint by catalog `operation_id`.
    ///
    /// `path_params` replaces `{param}` segments in the operation path template.
    /// Missing required parameters return
    /// [`ClientError::MissingPathParameter`].
    pub fn call_operation(
        &self,
        operation_id: &str,
        path_params: &[(&str, &str)],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let operation = operations::find_operation(operation_id)?;
        let rendered_path = operations::render_path(operation, path_params)?;
        let method = operations::parse_method(operation)?;
        self.send(method, &rendered_path, query, body)
    }

    /// Sends a `GET` request and normalizes the response.
    pub fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.request_json(Method::GET, path, None)
    }

    /// Sends a `GET` request with query parameters and normalizes the response.
    pub fn get_json_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        self.request_json_with_query(Method::GET, path, query, None)
    }

    pub fn post_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::POST, path, Some(body))
    }

    pub fn put_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::PUT, path, Some(body))
    }

    pub fn patch_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::PATCH, path, Some(body))
    }

    pub fn delete_json(&self, path: &str) -> Result<Value, ClientError> {
        self.request_json(Method::DELETE, path, None)
    }

    /// Sends a request and normalizes the response.
    ///
    /// Use [`Self::request_json_with_query`] when query parameters are needed.
    pub fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.request_json_with_query(method, path, &[], body)
    }

    /// Sends a request with query parameters and normalizes the response.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub fn request_json_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.send(method, path, query, body)
    }

    /// Opens `GET /api/v1/events` and returns a blocking event iterator.
    ///
    /// A non-success status is returned as [`ClientError::RequestFailed`]
    /// before any event is produced.
    pub fn subscribe_events<S: AsRef<str>>(
        &self,
        filter: &[S],
    ) -> Result<BlockingEventStream, ClientError> {
        self.subscribe_events_with_decoder(filter, SseDecoder::new())
    }

    /// Like [`Self::subscribe_events`], with a caller-supplied decoder.
    pub fn subscribe_events_with_decoder<S: AsRef<str>>(
        &self,
        filter: &[S],
        decoder: SseDecoder,
    ) -> Result<BlockingEventStream, ClientError> {
        let url = self.session.build_url(EVENTS_PATH)?;
        tracing::debug!(%url, "opening event stream");

        let mut request = self
            .stream_http
            .get(url)
            .header(ACCEPT, "text/event-stream");

        if let Some(filter) = filter_query(filter) {
            request = request.query(&[("filter", filter)]);
        }

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let payload = response.text().unwrap_or_default();
            return Err(request_failed(status, &payload));
        }

        Ok(BlockingEventStream::from_reader(
            response,
            decoder,
            self.session.shutdown_signal(),
        ))
    }

    pub fn agents(&self) -> Agents<'_> {
        Agents::new(self)
    }

    pub fn fs(&self) -> Fs<'_> {
        Fs::new(self)
    }

    pub fn templates(&self) -> Templates<'_> {
        Templates::new(self)
    }

    pub fn system(&self) -> System<'_> {
        System::new(self)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    pub fn cron(&self) -> Cron<'_> {
        Cron::new(self)
    }

    pub fn triggers(&self) -> Triggers<'_> {
        Triggers::new(self)
    }

    pub fn orgs(&self) -> Orgs<'_> {
        Orgs::new(self)
    }

    pub fn marketplace(&self) -> Marketplace<'_> {
        Marketplace::new(self)
    }

    pub fn integrations(&self) -> Integrations<'_> {
        Integrations::new(self)
    }

    pub fn webhooks(&self) -> Webhooks<'_> {
        Webhooks::new(self)
    }

    pub fn plugins(&self) -> Plugins<'_> {
        Plugins::new(self)
    }

    fn send<K, V>(
        &self,
        method: Method,
        path: &str,
        query: &[(K, V)],
        body: Option<Value>,
    ) -> Result<Value, ClientError>
    where
        K: Serialize,
        V: Serialize,
    {
        let url = self.session.build_url(path)?;
        tracing::debug!(%method, %url, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        if let Some(json_body) = body {
            request = request.json(&json_body);
        }

        let response = request.send()?;
        let status = response.status();
        normalize_body(status, response.text())
    }
}
