//! Hook dispatch and the shared email-to-profile-link cache.

pub mod crashlytics;
pub mod github;
pub mod pagerduty;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Redirect};
use axum::Json;
use parking_lot::RwLock;
use quip::{QuipApi, QuipClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;

/// Per-token cache of committer email to profile link. `None` records a
/// lookup the API rejected, so we do not repeat it.
pub type ProfileCache = RwLock<HashMap<String, HashMap<String, Option<String>>>>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub profiles: Arc<ProfileCache>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HookQuery {
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub service: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn home() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// Browsers landing on the hook URL get the configuration page instead.
pub async fn hook_redirect() -> Redirect {
    Redirect::to("/")
}

pub async fn hook(
    State(state): State<AppState>,
    Query(query): Query<HookQuery>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    if query.api_token.is_empty() {
        return Err(bad_request("api_token is required"));
    }
    if query.thread_id.is_empty() {
        return Err(bad_request("thread_id is required"));
    }

    info!(
        "Webhook for service {:?} on thread {}",
        query.service, query.thread_id
    );
    let client = state.config.client_for_token(&query.api_token);

    let result = match query.service.as_str() {
        "github" => github::handle(&client, &state, &query, &payload).await,
        "crashlytics" => crashlytics::handle(&client, &query.thread_id, &payload).await,
        "pagerduty" => pagerduty::handle(&client, &state, &query, &payload).await,
        _ => return Err(bad_request("unknown service")),
    };

    match result {
        Ok(()) => Ok(StatusCode::OK),
        Err(err) => {
            error!("Hook delivery failed: {}", err);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Delivery failed: {}", err),
                }),
            ))
        }
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Resolve an email address to a profile link, falling back to the address
/// itself. API rejections are cached per token; transient failures are not.
pub(crate) async fn user_for_email(
    client: &QuipClient,
    state: &AppState,
    token: &str,
    email: &str,
) -> String {
    if let Some(cached) = state
        .profiles
        .read()
        .get(token)
        .and_then(|cache| cache.get(email))
        .cloned()
    {
        return cached.unwrap_or_else(|| email.to_string());
    }

    let link = match client.get_user(email).await {
        Ok(Some(user)) => user
            .get("id")
            .and_then(Value::as_str)
            .map(|id| format!("https://quip.com/{}", id)),
        Ok(None) => None,
        Err(quip::Error::Api(_)) => None,
        Err(err) => {
            warn!("User lookup failed for {}: {}", email, err);
            return email.to_string();
        }
    };

    state
        .profiles
        .write()
        .entry(token.to_string())
        .or_default()
        .insert(email.to_string(), link.clone());

    link.unwrap_or_else(|| email.to_string())
}
