//! # Quip API Client
//!
//! The HTTP client shared by every endpoint wrapper: URL building, parameter
//! encoding, bearer authentication, and response/error normalization.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::api;
use crate::api::blobs::Blob;
use crate::api::folders::{NewFolder, UpdateFolder};
use crate::api::messages::{MessageOptions, NewMessage};
use crate::api::threads::{EditDocument, NewDocument, RecentThreads};
use crate::error::{ClientError, Error, Result};
use crate::websocket::QuipSocket;

/// Production API host.
const DEFAULT_BASE_URL: &str = "https://platform.quip.com";

/// Default per-request timeout, matching the platform's recommended 10s.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A parsed JSON response body (string keys to arbitrary JSON values).
pub type ApiObject = Map<String, Value>;

/// A parameter mapping for a single request, built per call and discarded
/// after the round-trip. Falsy values are stripped before encoding.
pub(crate) type Params = Vec<(&'static str, Value)>;

/// Connection settings for [`QuipClient`].
///
/// The base URL is explicit configuration rather than process-wide state:
/// point it at a non-production host (or a test double) per client instance.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Scheme, host and optional port of the API server, without the `/1`
    /// version prefix.
    pub base_url: String,
    /// Timeout applied to every request by the underlying transport.
    pub request_timeout: Duration,
    /// Bearer credential. When set, every request carries an
    /// `Authorization: Bearer` header.
    pub access_token: Option<String>,
    /// OAuth application id, used by the authorization-URL and token-exchange
    /// endpoints.
    pub client_id: Option<String>,
    /// OAuth application secret, used by the token-exchange endpoint.
    pub client_secret: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            access_token: None,
            client_id: None,
            client_secret: None,
        }
    }
}

/// A Quip API client.
///
/// To make API calls that access Quip data, construct with an access token:
///
/// ```rust,no_run
/// # async fn run() -> quip::Result<()> {
/// let client = quip::QuipClient::with_access_token("...");
/// let user = client.get_authenticated_user().await?;
/// # Ok(())
/// # }
/// ```
///
/// To implement OAuth login, construct with a client id and secret instead;
/// only [`authorization_url`](QuipClient::authorization_url) and
/// [`get_access_token`](QuipClient::get_access_token) work without a token.
///
/// The client holds only immutable credentials, so concurrent calls from the
/// same instance are independent and clones share the connection pool.
#[derive(Clone)]
pub struct QuipClient {
    pub(crate) http: Client,
    pub(crate) config: ClientConfig,
}

impl QuipClient {
    /// Create a client from explicit configuration.
    pub fn new(config: ClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("HTTP client build failed ({}), using transport defaults", err);
                Client::new()
            });
        Self { http, config }
    }

    /// Create a client that authenticates with the given access token.
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self::new(ClientConfig {
            access_token: Some(access_token.into()),
            ..Default::default()
        })
    }

    /// Create a client for an OAuth application (no access token yet).
    pub fn with_oauth_app(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::new(ClientConfig {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Default::default()
        })
    }

    /// Absolute URL for a relative API path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Attach the bearer header iff an access token is configured.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// The common call path: one round-trip, JSON out.
    ///
    /// With `params` the request is a POST with a form-encoded body (falsy
    /// entries stripped); without, a GET whose query string the caller has
    /// already folded into `path`.
    pub(crate) async fn call(&self, path: &str, params: Option<Params>) -> Result<Value> {
        let url = self.url(path);
        let request = match params {
            Some(params) => {
                debug!("POST {}", url);
                self.http.post(&url).form(&form_fields(params))
            }
            None => {
                debug!("GET {}", url);
                self.http.get(&url)
            }
        };
        let response = self.authorize(request).send().await?;
        read_json(path, response).await
    }

    /// [`call`](Self::call), expecting a JSON object body.
    pub(crate) async fn call_object(
        &self,
        path: &str,
        params: Option<Params>,
    ) -> Result<ApiObject> {
        into_object(self.call(path, params).await?, path)
    }
}

/// Endpoint wrappers. Each method is a thin delegation to the corresponding
/// module under [`crate::api`]; the batch accessors and their singular
/// projections live on the [`QuipApi`](crate::service::QuipApi) trait.
impl QuipClient {
    /// Returns the user corresponding to our access token.
    pub async fn get_authenticated_user(&self) -> Result<ApiObject> {
        api::users::get_authenticated_user(self).await
    }

    /// Returns the users in the authenticated user's contacts.
    pub async fn get_contacts(&self) -> Result<Vec<Value>> {
        api::users::get_contacts(self).await
    }

    /// Creates a new folder.
    pub async fn new_folder(&self, options: NewFolder<'_>) -> Result<ApiObject> {
        api::folders::new_folder(self, options).await
    }

    /// Updates a folder's title and/or color.
    pub async fn update_folder(&self, options: UpdateFolder<'_>) -> Result<ApiObject> {
        api::folders::update_folder(self, options).await
    }

    /// Adds the given users to the given folder.
    pub async fn add_folder_members(
        &self,
        folder_id: &str,
        member_ids: &[&str],
    ) -> Result<ApiObject> {
        api::folders::add_folder_members(self, folder_id, member_ids).await
    }

    /// Removes the given users from the given folder.
    pub async fn remove_folder_members(
        &self,
        folder_id: &str,
        member_ids: &[&str],
    ) -> Result<ApiObject> {
        api::folders::remove_folder_members(self, folder_id, member_ids).await
    }

    /// Returns the most recent messages for the given thread.
    pub async fn get_messages(
        &self,
        thread_id: &str,
        options: MessageOptions,
    ) -> Result<Vec<Value>> {
        api::messages::get_messages(self, thread_id, options).await
    }

    /// Sends a message on a thread.
    pub async fn new_message(&self, options: NewMessage<'_>) -> Result<ApiObject> {
        api::messages::new_message(self, options).await
    }

    /// Returns the recently updated threads for the authenticated user.
    pub async fn get_recent_threads(&self, options: RecentThreads) -> Result<ApiObject> {
        api::threads::get_recent_threads(self, options).await
    }

    /// Adds the given folder or user IDs to the given thread.
    pub async fn add_thread_members(
        &self,
        thread_id: &str,
        member_ids: &[&str],
    ) -> Result<ApiObject> {
        api::threads::add_thread_members(self, thread_id, member_ids).await
    }

    /// Removes the given folder or user IDs from the given thread.
    pub async fn remove_thread_members(
        &self,
        thread_id: &str,
        member_ids: &[&str],
    ) -> Result<ApiObject> {
        api::threads::remove_thread_members(self, thread_id, member_ids).await
    }

    /// Creates a new document from the given content.
    pub async fn new_document(&self, options: NewDocument<'_>) -> Result<ApiObject> {
        api::threads::new_document(self, options).await
    }

    /// Edits a document, adding the given content.
    pub async fn edit_document(&self, options: EditDocument<'_>) -> Result<ApiObject> {
        api::threads::edit_document(self, options).await
    }

    /// Downloads the contents of a blob attached to a thread.
    pub async fn get_blob(&self, thread_id: &str, blob_id: &str) -> Result<Blob> {
        api::blobs::get_blob(self, thread_id, blob_id).await
    }

    /// Uploads an image or other blob to a thread.
    pub async fn put_blob(
        &self,
        thread_id: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<ApiObject> {
        api::blobs::put_blob(self, thread_id, filename, data).await
    }

    /// Downloads a remote URL and attaches it to a thread as a blob.
    pub async fn put_blob_from_url(&self, thread_id: &str, url: &str) -> Result<ApiObject> {
        api::blobs::put_blob_from_url(self, thread_id, url).await
    }

    /// Returns the URL the user should be redirected to to sign in.
    /// Pure string building; no network call.
    pub fn authorization_url(&self, redirect_uri: &str, state: Option<&str>) -> String {
        api::oauth::authorization_url(self, redirect_uri, state)
    }

    /// Exchanges a verification code for an access token.
    pub async fn get_access_token(&self, redirect_uri: &str, code: &str) -> Result<ApiObject> {
        api::oauth::get_access_token(self, redirect_uri, code).await
    }

    /// Negotiates a websocket session descriptor.
    pub async fn new_websocket(&self) -> Result<ApiObject> {
        crate::websocket::new_websocket(self).await
    }

    /// Negotiates and opens a websocket connection to the platform.
    pub async fn connect_websocket(&self) -> Result<QuipSocket> {
        crate::websocket::connect_websocket(self).await
    }

    /// The connection settings this client was constructed with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// The JavaScript truthiness rule the wire format inherited: null, false,
/// empty strings and numeric zero are all omitted from encoded requests.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn encode(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Form fields for a POST body, with falsy entries stripped.
pub(crate) fn form_fields(params: Params) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter(|(_, value)| !is_falsy(value))
        .map(|(name, value)| (name.to_string(), encode(&value)))
        .collect()
}

/// Fold parameters into a path's query string, skipping falsy entries.
pub(crate) fn with_query(path: &str, params: Params) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in &params {
        if !is_falsy(value) {
            serializer.append_pair(name, &encode(value));
            any = true;
        }
    }
    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}

/// Normalize a response into parsed JSON or one of the three error kinds.
pub(crate) async fn read_json(path: &str, response: reqwest::Response) -> Result<Value> {
    if response.status() != StatusCode::OK {
        return Err(response_error(path, response).await);
    }
    let body = response.text().await?;
    match serde_json::from_str(&body) {
        Ok(info) => Ok(info),
        Err(_) => {
            error!("Invalid JSON from {}", path);
            Err(Error::Protocol {
                path: path.to_string(),
                body,
            })
        }
    }
}

/// The error a non-200 response carries: the parsed payload as an API error
/// when the body is well-formed JSON, a protocol error otherwise.
pub(crate) async fn response_error(path: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let headers = response.headers().clone();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return Error::Network(err),
    };
    match serde_json::from_str(&body) {
        Ok(info) => {
            error!("API error {} for {}", status.as_u16(), path);
            ClientError::new(status, headers, info).into()
        }
        Err(_) => {
            error!("Invalid JSON from {}", path);
            Error::Protocol {
                path: path.to_string(),
                body,
            }
        }
    }
}

/// Expect a JSON object at the top level of a response.
pub(crate) fn into_object(value: Value, path: &str) -> Result<ApiObject> {
    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::Protocol {
            path: path.to_string(),
            body: other.to_string(),
        }),
    }
}

/// Expect a JSON array at the top level of a response.
pub(crate) fn into_array(value: Value, path: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(array) => Ok(array),
        other => Err(Error::Protocol {
            path: path.to_string(),
            body: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values_are_stripped_from_form_fields() {
        let fields = form_fields(vec![
            ("title", json!("Projects")),
            ("parent_id", Value::Null),
            ("silent", json!(false)),
            ("count", json!(0)),
            ("member_ids", json!("")),
            ("color", json!(2)),
        ]);
        assert_eq!(
            fields,
            vec![
                ("title".to_string(), "Projects".to_string()),
                ("color".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_true_and_nonzero_values_survive() {
        let fields = form_fields(vec![("silent", json!(1)), ("count", json!(25))]);
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_with_query_skips_falsy_and_encodes() {
        let path = with_query(
            "oauth/login",
            vec![
                ("redirect_uri", json!("https://example.com/cb?x=1")),
                ("state", Value::Null),
                ("response_type", json!("code")),
            ],
        );
        assert_eq!(
            path,
            "oauth/login?redirect_uri=https%3A%2F%2Fexample.com%2Fcb%3Fx%3D1&response_type=code"
        );
    }

    #[test]
    fn test_with_query_leaves_path_alone_when_empty() {
        assert_eq!(
            with_query("threads/recent", vec![("count", Value::Null)]),
            "threads/recent"
        );
    }

    #[test]
    fn test_url_includes_version_prefix() {
        let client = QuipClient::new(ClientConfig {
            base_url: "https://platform.example.com:10000/".to_string(),
            ..Default::default()
        });
        assert_eq!(
            client.url("users/current"),
            "https://platform.example.com:10000/1/users/current"
        );
    }

    #[test]
    fn test_into_object_rejects_non_objects() {
        assert!(into_object(json!([1, 2]), "users/").is_err());
        assert!(into_object(json!({"a": 1}), "users/").is_ok());
    }
}
