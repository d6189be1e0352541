use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Url;
use serde_json::Value;
use tokio::sync::watch;

use crate::ClientError;

/// State shared by the async and blocking clients: base URL, bearer token and
/// the shutdown signal observed by open event streams.
///
/// The token is read once per request when headers are built. A concurrent
/// update is visible to requests built after it; the last writer wins.
#[derive(Clone, Debug)]
pub(crate) struct Session {
    base_url: Url,
    token: Arc<RwLock<Option<String>>>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl Session {
    /// Parses `base_url` and normalizes it to include a trailing slash, so
    /// relative endpoint paths join correctly.
    pub(crate) fn new(base_url: &str, token: Option<String>) -> Result<Self, ClientError> {
        let parsed =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_owned()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_owned()));
        }

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            base_url: ensure_trailing_slash(parsed),
            token: Arc::new(RwLock::new(token)),
            shutdown: Arc::new(shutdown),
        })
    }

    /// Base URL with trailing slashes stripped.
    pub(crate) fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub(crate) fn build_url(&self, path: &str) -> Result<Url, ClientError> {
        let relative = path.trim_start_matches('/');
        self.base_url
            .join(relative)
            .map_err(|_| ClientError::InvalidPath(path.to_owned()))
    }

    /// Current token; an empty token counts as no token.
    pub(crate) fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|token| !token.is_empty())
            .cloned()
    }

    pub(crate) fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Stores `token` from a login response when it is a string.
    pub(crate) fn store_login_token(&self, response: &Value) {
        if let Some(token) = response.get("token").and_then(Value::as_str) {
            tracing::debug!("stored bearer token from login response");
            self.set_token(Some(token.to_owned()));
        }
    }

    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub(crate) fn close(&self) {
        tracing::debug!(base_url = %self.base_url, "closing client");
        self.shutdown.send_replace(true);
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    let path = format!("{}/", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}
