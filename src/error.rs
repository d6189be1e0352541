use thiserror::Error;

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// Endpoint path could not be joined to the base URL.
    #[error("invalid endpoint path '{0}'")]
    InvalidPath(String),

    /// The requested operation id is not present in the endpoint catalog.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    /// A required path template parameter was not provided.
    #[error("missing required path parameter '{parameter}' for operation '{operation_id}'")]
    MissingPathParameter {
        operation_id: String,
        parameter: String,
    },

    /// HTTP transport-layer failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A successful response body was not JSON, or a request body could not be serialized.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a blocking event stream failed.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The server answered with a non-success status.
    ///
    /// `code` and `message` come from the `{"error": {...}}` body when present,
    /// otherwise from the HTTP status line.
    #[error("[{code}] {message} (HTTP {status})")]
    RequestFailed {
        message: String,
        code: String,
        status: u16,
    },
}

impl ClientError {
    /// HTTP status of a [`ClientError::RequestFailed`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Machine-readable code of a [`ClientError::RequestFailed`] error,
    /// for example `AGENT_NOT_FOUND` or `HTTP_404`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::RequestFailed { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ClientError;

    #[test]
    fn request_failed_display_includes_code_and_status() {
        let error = ClientError::RequestFailed {
            message: "Agent not found".to_owned(),
            code: "AGENT_NOT_FOUND".to_owned(),
            status: 404,
        };
        assert_eq!(error.to_string(), "[AGENT_NOT_FOUND] Agent not found (HTTP 404)");
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.code(), Some("AGENT_NOT_FOUND"));
    }

    #[test]
    fn non_http_errors_have_no_status() {
        let error = ClientError::UnknownOperation("nope".to_owned());
        assert_eq!(error.status(), None);
        assert_eq!(error.code(), None);
    }
}
