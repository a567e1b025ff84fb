use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a Quip API call can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure. The client never retries; the caller decides.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body was not valid JSON, whatever the status code.
    #[error("invalid response for {path}: {body}")]
    Protocol { path: String, body: String },

    /// The API answered with a non-200 status.
    #[error(transparent)]
    Api(#[from] ClientError),

    /// Websocket connect or handshake failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

/// A non-200 API response: the original status and headers plus the parsed
/// error body, so callers can branch on the failure (auth vs. not-found vs.
/// rate limiting).
#[derive(Debug)]
pub struct ClientError {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub info: Value,
}

impl ClientError {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, info: Value) -> Self {
        Self {
            status,
            headers,
            info,
        }
    }

    /// The developer-facing message from the error body, when the API sent one.
    pub fn error_description(&self) -> Option<&str> {
        self.info.get("error_description").and_then(Value::as_str)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.error_description() {
            Some(description) => write!(f, "{}: {}", self.status.as_u16(), description),
            None => write!(f, "{}", self.status),
        }
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_error_display_with_description() {
        let error = ClientError::new(
            StatusCode::FORBIDDEN,
            HeaderMap::new(),
            json!({"error": "invalid_token", "error_description": "Bad token"}),
        );
        assert_eq!(error.to_string(), "403: Bad token");
    }

    #[test]
    fn test_client_error_display_without_description() {
        let error = ClientError::new(StatusCode::NOT_FOUND, HeaderMap::new(), json!({}));
        assert_eq!(error.to_string(), "404 Not Found");
    }
}
