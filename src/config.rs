use std::time::Duration;

/// Default per-request timeout for ordinary JSON calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Construction options shared by [`crate::AetherClient`] and
/// [`crate::BlockingAetherClient`].
///
/// ```
/// use std::time::Duration;
/// use aether_client::ClientConfig;
///
/// let config = ClientConfig::new("http://localhost:3000")
///     .with_token("my-token")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.timeout, Duration::from_secs(10));
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Root URL of the server, for example `http://localhost:3000`.
    pub base_url: String,
    /// Bearer token sent with every request, if set.
    pub token: Option<String>,
    /// Timeout for request/response calls.
    pub timeout: Duration,
    /// Timeout for event streams. `None` waits for events indefinitely.
    pub stream_timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            stream_timeout: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
