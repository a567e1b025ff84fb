//! Binary attachment (blob) endpoints. Uploads use multipart form data
//! rather than the common form-encoded call path.

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::{into_object, read_json, response_error, ApiObject, QuipClient};
use crate::error::Result;

/// A downloaded blob: raw bytes plus the content type the platform reported.
#[derive(Debug)]
pub struct Blob {
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Downloads the contents of the given blob from the given thread.
pub async fn get_blob(client: &QuipClient, thread_id: &str, blob_id: &str) -> Result<Blob> {
    let path = format!("blob/{}/{}", thread_id, blob_id);
    let url = client.url(&path);
    debug!("GET {}", url);
    let response = client.authorize(client.http.get(&url)).send().await?;
    if response.status() != reqwest::StatusCode::OK {
        // Non-200 bodies are JSON error payloads; normalize them like any
        // other API failure.
        return Err(response_error(&path, response).await);
    }
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    let data = response.bytes().await?.to_vec();
    Ok(Blob { content_type, data })
}

/// Uploads an image or other blob to the given thread. The response carries
/// an ID that can be used to reference the blob from the thread's document.
pub async fn put_blob(
    client: &QuipClient,
    thread_id: &str,
    filename: &str,
    data: Vec<u8>,
) -> Result<ApiObject> {
    let path = format!("blob/{}", thread_id);
    let url = client.url(&path);
    debug!("POST {} ({} bytes)", url, data.len());
    let part = Part::bytes(data).file_name(filename.to_string());
    let form = Form::new().part("blob", part);
    let response = client
        .authorize(client.http.post(&url).multipart(form))
        .send()
        .await?;
    into_object(read_json(&path, response).await?, &path)
}

/// Downloads a remote URL and attaches its contents to the given thread.
pub async fn put_blob_from_url(
    client: &QuipClient,
    thread_id: &str,
    url: &str,
) -> Result<ApiObject> {
    debug!("Fetching blob source from {}", url);
    let response = client.http.get(url).send().await?;
    let filename = response
        .url()
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("blob")
        .to_string();
    let data = response.bytes().await?.to_vec();
    put_blob(client, thread_id, &filename, data).await
}
