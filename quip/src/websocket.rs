//! Websocket session negotiation.
//!
//! One REST call to `websockets/new` returns a session descriptor with a
//! signed URL; the client then opens a standard full-duplex connection to
//! that URL. Reconnection is the caller's concern, like every other retry.

use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use url::Url;

use crate::client::{ApiObject, QuipClient};
use crate::error::{Error, Result};

const WEBSOCKETS_NEW: &str = "websockets/new";

/// The connected socket type handed back to callers.
pub type QuipSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Negotiates a websocket session descriptor (`url`, `user_id`, ...).
pub async fn new_websocket(client: &QuipClient) -> Result<ApiObject> {
    client.call_object(WEBSOCKETS_NEW, None).await
}

/// Negotiates a session and opens the connection, with the `Origin` header
/// derived from the signed URL's scheme and host. Fails fast when the
/// descriptor lacks a URL.
pub async fn connect_websocket(client: &QuipClient) -> Result<QuipSocket> {
    let descriptor = new_websocket(client).await?;
    let socket_url = match descriptor.get("url").and_then(Value::as_str) {
        Some(socket_url) => socket_url,
        None => {
            let reason = descriptor
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("session descriptor has no url");
            return Err(Error::Protocol {
                path: WEBSOCKETS_NEW.to_string(),
                body: reason.to_string(),
            });
        }
    };

    let origin = origin_of(socket_url)?;
    let mut request = socket_url.into_client_request()?;
    request.headers_mut().insert(
        ORIGIN,
        origin.parse().map_err(|_| Error::Protocol {
            path: WEBSOCKETS_NEW.to_string(),
            body: format!("invalid origin derived from {}", socket_url),
        })?,
    );

    info!("Connecting to websocket at {}", socket_url);
    let (stream, response) = connect_async(request).await?;
    debug!("Websocket handshake complete: {}", response.status());
    Ok(stream)
}

fn origin_of(socket_url: &str) -> Result<String> {
    let parsed = Url::parse(socket_url).map_err(|err| Error::Protocol {
        path: WEBSOCKETS_NEW.to_string(),
        body: format!("unparseable socket url {}: {}", socket_url, err),
    })?;
    match parsed.host_str() {
        Some(host) => Ok(format!("{}://{}", parsed.scheme(), host)),
        None => Err(Error::Protocol {
            path: WEBSOCKETS_NEW.to_string(),
            body: format!("socket url {} has no host", socket_url),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_drops_path_and_port() {
        assert_eq!(
            origin_of("wss://ws.example.com:443/session/abc?token=1").unwrap(),
            "wss://ws.example.com"
        );
    }

    #[test]
    fn test_origin_rejects_garbage() {
        assert!(origin_of("not a url").is_err());
    }
}
