//! Turns raw HTTP responses into an unwrapped payload or a [`ClientError::RequestFailed`].
//!
//! Successful JSON bodies may come wrapped as `{"data": ...}`; the wrapper is
//! removed when present at the top level. Failures carry
//! `{"error": {"code": ..., "message": ...}}` when the server produced one,
//! and fall back to the status line otherwise.

use reqwest::StatusCode;
use serde_json::Value;

use crate::ClientError;

/// Normalizes a response given its status and body text.
///
/// This is a pure function of its inputs: normalizing the same response twice
/// yields equal results.
///
/// An empty successful body (for example `204 No Content`) yields [`Value::Null`].
pub fn normalize_response(status: StatusCode, body: &str) -> Result<Value, ClientError> {
    if !status.is_success() {
        return Err(request_failed(status, body));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let parsed: Value = serde_json::from_str(body)?;
    Ok(unwrap_envelope(parsed))
}

/// Normalizes a response whose body read may itself have failed.
///
/// A failed read on a non-success response still yields
/// [`ClientError::RequestFailed`] built from the status line; on a success
/// response the read error is returned as-is.
pub(crate) fn normalize_body<E>(
    status: StatusCode,
    body: Result<String, E>,
) -> Result<Value, ClientError>
where
    E: Into<ClientError>,
{
    if !status.is_success() {
        return Err(request_failed(status, &body.unwrap_or_default()));
    }
    normalize_response(status, &body.map_err(Into::into)?)
}

/// Returns `body["data"]` when `body` is an object with a `data` key, else `body`.
pub fn unwrap_envelope(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Builds the error for a non-success response.
///
/// Application-level `error.code`/`error.message` win when the body is a JSON
/// object of the expected shape; otherwise `HTTP_<status>` and
/// `HTTP <status>: <reason>` are used. A body that is not JSON is not an error
/// by itself.
pub(crate) fn request_failed(status: StatusCode, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let error_field = |field: &str| {
        parsed
            .as_ref()
            .and_then(|value| value.get("error"))
            .and_then(|error| error.get(field))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_owned)
    };

    let message = error_field("message").unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
    });
    let code = error_field("code").unwrap_or_else(|| format!("HTTP_{}", status.as_u16()));

    tracing::debug!(status = status.as_u16(), %code, "request failed");

    ClientError::RequestFailed {
        message,
        code,
        status: status.as_u16(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use serde_json::json;

    use super::{normalize_body, normalize_response};
    use crate::ClientError;

    fn failure(status: u16, body: &str) -> (String, String, u16) {
        let status = StatusCode::from_u16(status).expect("valid status");
        match normalize_response(status, body).expect_err("non-2xx must fail") {
            ClientError::RequestFailed {
                message,
                code,
                status,
            } => (message, code, status),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unwraps_data_envelope() {
        let body = json!({"data": [{"id": "a1", "nested": {"k": [1, 2]}}], "total": 1});
        let value = normalize_response(StatusCode::OK, &body.to_string()).expect("success");
        assert_eq!(value, json!([{"id": "a1", "nested": {"k": [1, 2]}}]));
    }

    #[test]
    fn returns_whole_body_without_envelope() {
        let body = json!({"token": "jwt-1", "user": {"id": "u1"}});
        let value = normalize_response(StatusCode::OK, &body.to_string()).expect("success");
        assert_eq!(value, body);
    }

    #[test]
    fn non_object_bodies_pass_through() {
        let value = normalize_response(StatusCode::OK, "[1,2,3]").expect("success");
        assert_eq!(value, json!([1, 2, 3]));
        let value = normalize_response(StatusCode::CREATED, "\"ok\"").expect("success");
        assert_eq!(value, json!("ok"));
    }

    #[test]
    fn nested_data_key_is_not_unwrapped() {
        let body = json!({"result": {"data": 1}});
        let value = normalize_response(StatusCode::OK, &body.to_string()).expect("success");
        assert_eq!(value, body);
    }

    #[test]
    fn null_data_is_still_unwrapped() {
        let value = normalize_response(StatusCode::OK, r#"{"data": null}"#).expect("success");
        assert_eq!(value, json!(null));
    }

    #[test]
    fn empty_success_body_is_null() {
        let value = normalize_response(StatusCode::NO_CONTENT, "").expect("success");
        assert_eq!(value, json!(null));
    }

    #[test]
    fn invalid_success_body_is_a_json_error() {
        let error = normalize_response(StatusCode::OK, "<html>").expect_err("not json");
        assert!(matches!(error, ClientError::Json(_)));
    }

    #[test]
    fn structured_error_body_is_used() {
        let body = json!({"error": {"code": "AGENT_NOT_FOUND", "message": "Agent not found"}});
        let (message, code, status) = failure(404, &body.to_string());
        assert_eq!(message, "Agent not found");
        assert_eq!(code, "AGENT_NOT_FOUND");
        assert_eq!(status, 404);
    }

    #[test]
    fn non_json_error_body_falls_back_to_status_line() {
        let (message, code, status) = failure(502, "<html>Bad Gateway</html>");
        assert_eq!(message, "HTTP 502: Bad Gateway");
        assert_eq!(code, "HTTP_502");
        assert_eq!(status, 502);
    }

    #[test]
    fn empty_error_body_falls_back_to_status_line() {
        let (message, code, _) = failure(500, "");
        assert_eq!(message, "HTTP 500: Internal Server Error");
        assert_eq!(code, "HTTP_500");
    }

    #[test]
    fn partial_error_body_mixes_fallbacks() {
        let (message, code, _) = failure(401, r#"{"error": {"message": "Token expired"}}"#);
        assert_eq!(message, "Token expired");
        assert_eq!(code, "HTTP_401");

        let (message, code, _) = failure(400, r#"{"error": "bad"}"#);
        assert_eq!(message, "HTTP 400: Bad Request");
        assert_eq!(code, "HTTP_400");
    }

    #[test]
    fn normalization_is_repeatable() {
        let body = r#"{"error": {"code": "X", "message": "Y"}}"#;
        assert_eq!(failure(409, body), failure(409, body));

        let ok = r#"{"data": {"id": 7}}"#;
        assert_eq!(
            normalize_response(StatusCode::OK, ok).expect("success"),
            normalize_response(StatusCode::OK, ok).expect("success"),
        );
    }

    #[test]
    fn unreadable_failure_body_keeps_status_line() {
        let body: Result<String, ClientError> = Err(ClientError::InvalidPath("reset".to_owned()));
        match normalize_body(StatusCode::BAD_GATEWAY, body).expect_err("non-2xx must fail") {
            ClientError::RequestFailed {
                message,
                code,
                status,
            } => {
                assert_eq!(message, "HTTP 502: Bad Gateway");
                assert_eq!(code, "HTTP_502");
                assert_eq!(status, 502);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unreadable_success_body_is_returned() {
        let body: Result<String, ClientError> = Err(ClientError::InvalidPath("reset".to_owned()));
        assert!(matches!(
            normalize_body(StatusCode::OK, body),
            Err(ClientError::InvalidPath(_))
        ));
        let body: Result<String, ClientError> = Ok(r#"{"data": 1}"#.to_owned());
        assert_eq!(normalize_body(StatusCode::OK, body).expect("success"), json!(1));
    }
}
