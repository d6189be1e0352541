use reqwest::Method;
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde_json::Value;

use crate::events::{EVENTS_PATH, EventStream, SseDecoder, filter_query};
use crate::namespaces::{
    Agents, Cron, Events, Fs, Integrations, Marketplace, Orgs, Plugins, System, Templates,
    Triggers, Webhooks,
};
use crate::operations::{self, ApiRequest, OperationDefinition};
use crate::params::Credentials;
use crate::response::{normalize_body, request_failed};
use crate::session::Session;
use crate::{ClientConfig, ClientError};

/// Async client for the Aether OS REST API.
///
/// Every call sends one HTTP request and returns the normalized JSON payload:
/// the `data` field of `{"data": ...}` bodies, or the whole body otherwise.
/// Non-success responses become [`ClientError::RequestFailed`].
///
/// Clones share the bearer token and connection pool.
///
/// ```no_run
/// # async fn run() -> Result<(), aether_client::ClientError> {
/// use aether_client::AetherClient;
///
/// let client = AetherClient::new("http://localhost:3000")?;
/// client.login("admin", "password").await?;
/// let agents = client.agents().list(&Default::default()).await?;
/// println!("{agents}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct AetherClient {
    session: Session,
    http: reqwest::Client,
    stream_http: reqwest::Client,
}

impl AetherClient {
    /// Creates a client with default settings for the given base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::new(base_url.as_ref()))
    }

    /// Creates a client from explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        let mut stream_builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.stream_timeout {
            stream_builder = stream_builder.timeout(timeout);
        }

        Ok(Self {
            session: Session::new(&config.base_url, config.token)?,
            http,
            stream_http: stream_builder.build()?,
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

    /// Ends every event stream opened through this client or its clones.
    ///
    /// Streams opened afterwards end immediately. Request/response calls are
    /// unaffected.
    pub fn close(&self) {
        self.session.close();
    }

    /// Exchanges credentials for a token via `POST /api/auth/login`.
    ///
    /// On success the returned token is stored for subsequent requests and the
    /// full response (`{"token": ..., "user": ...}`) is returned unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<Value, ClientError> {
        let request = ApiRequest::new(&operations::LOGIN).json(&Credentials { username, password })?;
        let result = self.execute(request).await?;
        self.session.store_login_token(&result);
        Ok(result)
    }

    /// Returns every operation in the endpoint catalog.
    pub fn operations() -> &'static [OperationDefinition] {
        operations::OPERATIONS
    }

    /// Sends a catalog request built with [`ApiRequest`].
    pub async fn execute(&self, request: ApiRequest) -> Result<Value, ClientError> {
        let (method, path, query, body) = request.into_parts()?;
        self.send(method, &path, query.as_slice(), body).await
    }

    /// Calls an endpoint by catalog `operation_id`.
    ///
    /// `path_params` replaces `{param}` segments in the operation path template.
    /// Missing required parameters return
    /// [`ClientError::MissingPathParameter`].
    pub async fn call_operation(
        &self,
        operation_id: &str,
        path_params: &[(&str, &str)],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let operation = operations::find_operation(operation_id)?;
        let rendered_path = operations::render_path(operation, path_params)?;
        let method = operations::parse_method(operation)?;
        self.send(method, &rendered_path, query, body).await
    }

    /// Sends a `GET` request and normalizes the response.
    pub async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.request_json(Method::GET, path, None).await
    }

    /// Sends a `GET` request with query parameters and normalizes the response.
    pub async fn get_json_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        self.request_json_with_query(Method::GET, path, query, None)
            .await
    }

    /// Sends a `POST` request with a JSON body and normalizes the response.
    pub async fn post_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::POST, path, Some(body)).await
    }

    /// Sends a `PUT` request with a JSON body and normalizes the response.
    pub async fn put_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::PUT, path, Some(body)).await
    }

    /// Sends a `PATCH` request with a JSON body and normalizes the response.
    pub async fn patch_json(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request_json(Method::PATCH, path, Some(body)).await
    }

    /// Sends a `DELETE` request and normalizes the response.
    pub async fn delete_json(&self, path: &str) -> Result<Value, ClientError> {
        self.request_json(Method::DELETE, path, None).await
    }

    /// Sends a request and normalizes the response.
    ///
    /// Use [`Self::request_json_with_query`] when query parameters are needed.
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.request_json_with_query(method, path, &[], body).await
    }

    /// Sends a request with query parameters and normalizes the response.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub async fn request_json_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        self.send(method, path, query, body).await
    }

    /// Opens `GET /api/v1/events` and returns the decoded event stream.
    ///
    /// `filter` restricts the stream to the given event types; an empty slice
    /// subscribes to everything. A non-success status is returned as
    /// [`ClientError::RequestFailed`] before any event is produced.
    pub async fn subscribe_events<S: AsRef<str>>(
        &self,
        filter: &[S],
    ) -> Result<EventStream, ClientError> {
        self.subscribe_events_with_decoder(filter, SseDecoder::new())
            .await
    }

    /// Like [`Self::subscribe_events`], with a caller-supplied decoder (for
    /// example one carrying a malformed-record hook).
    pub async fn subscribe_events_with_decoder<S: AsRef<str>>(
        &self,
        filter: &[S],
        decoder: SseDecoder,
    ) -> Result<EventStream, ClientError> {
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

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let payload = response.text().await.unwrap_or_default();
            return Err(request_failed(status, &payload));
        }

        Ok(EventStream::from_chunks(
            response.bytes_stream(),
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

    async fn send<K, V>(
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

        let response = request.send().await?;
        let status = response.status();
        normalize_body(status, response.text().await)
    }
}

#[cfg(test)]
mod tests {
    use super::AetherClient;
    use crate::{ClientConfig, ClientError};

    #[test]
    fn token_from_config_is_used() {
        let client = AetherClient::with_config(
            ClientConfig::new("http://localhost:3000").with_token("my-token"),
        )
        .expect("valid config");
        assert_eq!(client.token().as_deref(), Some("my-token"));
        client.clear_token();
        assert_eq!(client.token(), None);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            AetherClient::new("::not-a-url"),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn catalog_is_exposed() {
        assert!(
            AetherClient::operations()
                .iter()
                .any(|op| op.operation_id == "login")
        );
    }
}
