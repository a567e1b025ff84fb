//! OAuth login and token exchange.

use serde_json::json;

use super::opt_str;
use crate::client::{with_query, ApiObject, QuipClient};
use crate::error::Result;

/// Returns the URL the user should be redirected to to sign in.
///
/// Pure string building against the configured base URL and client id; the
/// network round-trip happens when the user's browser follows the redirect.
pub fn authorization_url(client: &QuipClient, redirect_uri: &str, state: Option<&str>) -> String {
    let path = with_query(
        "oauth/login",
        vec![
            ("redirect_uri", json!(redirect_uri)),
            ("state", opt_str(state)),
            ("response_type", json!("code")),
            ("client_id", opt_str(client.config.client_id.as_deref())),
        ],
    );
    client.url(&path)
}

/// Exchanges a verification code for an access token.
///
/// Once the user is redirected back to your server from the URL returned by
/// [`authorization_url`], exchange the `code` query argument here.
pub async fn get_access_token(
    client: &QuipClient,
    redirect_uri: &str,
    code: &str,
) -> Result<ApiObject> {
    let path = with_query(
        "oauth/access_token",
        vec![
            ("redirect_uri", json!(redirect_uri)),
            ("code", json!(code)),
            ("grant_type", json!("authorization_code")),
            ("client_id", opt_str(client.config.client_id.as_deref())),
            (
                "client_secret",
                opt_str(client.config.client_secret.as_deref()),
            ),
        ],
    );
    client.call_object(&path, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;

    #[test]
    fn test_authorization_url_is_pure_string_building() {
        let client = QuipClient::new(ClientConfig {
            client_id: Some("app123".to_string()),
            ..Default::default()
        });
        let url = authorization_url(&client, "https://example.com/callback", Some("xyz"));
        assert_eq!(
            url,
            "https://platform.quip.com/1/oauth/login?\
             redirect_uri=https%3A%2F%2Fexample.com%2Fcallback&state=xyz&\
             response_type=code&client_id=app123"
        );
    }

    #[test]
    fn test_authorization_url_omits_absent_state() {
        let client = QuipClient::new(ClientConfig {
            client_id: Some("app123".to_string()),
            ..Default::default()
        });
        let url = authorization_url(&client, "https://example.com/callback", None);
        assert!(!url.contains("state="));
    }
}
