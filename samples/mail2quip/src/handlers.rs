//! Inbound email handling: find a usable token in the recipient list, then
//! post the email body as a thread message or a new document.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use quip::{DocumentFormat, NewDocument, NewMessage, QuipApi, QuipClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::Config;

/// Inbound mail webhook payload, form-encoded by the mail provider.
#[derive(Debug, Deserialize)]
pub struct InboundEmail {
    pub recipient: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "body-plain", default)]
    pub body_plain: String,
    #[serde(rename = "body-html", default)]
    pub body_html: String,
    #[serde(rename = "Message-Id", default)]
    pub message_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct DeliveryResponse {
    pub thread_id: String,
    /// True when the email created a new document rather than a message.
    pub created: bool,
}

/// Where an address routes: an existing thread, or a fresh document owned by
/// the token's user.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Destination {
    Thread { thread_id: String, token: String },
    Document { token: String },
}

/// Parse `<thread_id>+<token>@domain` or `<token>@domain`. Thread IDs are
/// 11 or 12 characters; anything else is treated as a bare token.
pub(crate) fn parse_destination(address: &str) -> Option<Destination> {
    let local = address.trim().split('@').next()?;
    if local.is_empty() {
        return None;
    }
    if let Some((thread_id, token)) = local.split_once('+') {
        if (thread_id.len() == 11 || thread_id.len() == 12) && !token.is_empty() {
            return Some(Destination::Thread {
                thread_id: thread_id.to_string(),
                token: token.to_string(),
            });
        }
    }
    Some(Destination::Document {
        token: local.to_string(),
    })
}

/// Common signature tails that should not end up in the thread.
const SIGNATURE_PATTERNS: [&str; 2] = ["\n----", "\nIFTTT"];

pub(crate) fn strip_signature(text: &str) -> &str {
    let mut end = text.len();
    for pattern in SIGNATURE_PATTERNS {
        if let Some(index) = text.find(pattern) {
            end = end.min(index);
        }
    }
    &text[..end]
}

pub async fn home() -> Html<&'static str> {
    Html(include_str!("../templates/index.html"))
}

pub async fn receive_mail(
    State(config): State<Config>,
    Form(email): Form<InboundEmail>,
) -> Result<(StatusCode, Json<DeliveryResponse>), (StatusCode, Json<ErrorResponse>)> {
    info!("Inbound mail from {} to {}", email.sender, email.recipient);

    // The first recipient whose embedded token verifies wins.
    let mut verified: Option<(QuipClient, Option<String>)> = None;
    for address in email.recipient.split(',') {
        let Some(destination) = parse_destination(address) else {
            continue;
        };
        match destination {
            Destination::Thread { thread_id, token } => {
                let client = config.client_for_token(&token);
                match client.get_thread(&thread_id).await {
                    Ok(Some(_)) => {
                        verified = Some((client, Some(thread_id)));
                        break;
                    }
                    Ok(None) => warn!("Thread {} not visible to token", thread_id),
                    Err(err) => warn!("Thread lookup failed: {}", err),
                }
                // The address may not embed a thread id after all; the
                // whole local part could be a bare token.
                let local = format!("{}+{}", thread_id, token);
                let client = config.client_for_token(&local);
                match client.get_authenticated_user().await {
                    Ok(_) => {
                        verified = Some((client, None));
                        break;
                    }
                    Err(err) => warn!("Token verification failed: {}", err),
                }
            }
            Destination::Document { token } => {
                let client = config.client_for_token(&token);
                match client.get_authenticated_user().await {
                    Ok(_) => {
                        verified = Some((client, None));
                        break;
                    }
                    Err(err) => warn!("Token verification failed: {}", err),
                }
            }
        }
    }

    let Some((client, thread_id)) = verified else {
        error!("Could not find a usable token in {:?}", email.recipient);
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No usable access token in recipient addresses".to_string(),
            }),
        ));
    };

    let text = strip_signature(&email.body_plain);

    match thread_id {
        Some(thread_id) => {
            // Post a message to the existing thread.
            client
                .new_message(NewMessage {
                    thread_id: &thread_id,
                    content: text,
                    silent: email.subject.contains("silent"),
                    service_id: email.message_id.as_deref(),
                    ..Default::default()
                })
                .await
                .map_err(delivery_failure)?;
            Ok((
                StatusCode::OK,
                Json(DeliveryResponse {
                    thread_id,
                    created: false,
                }),
            ))
        }
        None => {
            // Create a document from the message body.
            let (content, format) = if email.body_html.is_empty() {
                (text, DocumentFormat::Markdown)
            } else {
                (email.body_html.as_str(), DocumentFormat::Html)
            };
            let thread = client
                .new_document(NewDocument {
                    content,
                    format: Some(format),
                    title: (!email.subject.is_empty()).then_some(email.subject.as_str()),
                    ..Default::default()
                })
                .await
                .map_err(delivery_failure)?;
            let thread_id = thread
                .get("thread")
                .and_then(|thread| thread.get("id"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Ok((
                StatusCode::OK,
                Json(DeliveryResponse {
                    thread_id,
                    created: true,
                }),
            ))
        }
    }
}

fn delivery_failure(err: quip::Error) -> (StatusCode, Json<ErrorResponse>) {
    error!("Delivery failed: {}", err);
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: format!("Delivery failed: {}", err),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_thread_destination() {
        let destination = parse_destination("UVWXYZabcde+secrettoken@mail.example.com");
        assert_eq!(
            destination,
            Some(Destination::Thread {
                thread_id: "UVWXYZabcde".to_string(),
                token: "secrettoken".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_rejects_wrong_thread_id_length() {
        // Nine characters before the plus: not a thread id, so the whole
        // local part is treated as a bare token.
        let destination = parse_destination("shortid12+token@example.com");
        assert_eq!(
            destination,
            Some(Destination::Document {
                token: "shortid12+token".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_bare_token() {
        assert_eq!(
            parse_destination("justatoken@example.com"),
            Some(Destination::Document {
                token: "justatoken".to_string(),
            })
        );
        assert_eq!(parse_destination("@example.com"), None);
    }

    #[tokio::test]
    async fn test_failed_thread_lookup_falls_back_to_local_part_token() {
        use serde_json::json;
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        // The embedded token cannot see the thread...
        Mock::given(method("GET"))
            .and(path("/1/threads/"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"error": "invalid_token"})),
            )
            .mount(&server)
            .await;
        // ...but the whole local part verifies as a token of its own.
        Mock::given(method("GET"))
            .and(path("/1/users/current"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "U1"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/1/threads/new-document"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"thread": {"id": "Tnew"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = Config {
            bind_address: String::new(),
            platform_base_url: Some(server.uri()),
        };
        let email = InboundEmail {
            recipient: "UVWXYZabcde+sometoken@mail.example.com".to_string(),
            sender: "ada@example.com".to_string(),
            subject: "Notes".to_string(),
            body_plain: "hello".to_string(),
            body_html: String::new(),
            message_id: None,
        };

        let (status, Json(response)) = receive_mail(State(config), Form(email)).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.thread_id, "Tnew");
        assert!(response.created);
    }

    #[test]
    fn test_strip_signature() {
        assert_eq!(
            strip_signature("hello world\n----\nsent from my phone"),
            "hello world"
        );
        assert_eq!(strip_signature("body\nIFTTT trailer"), "body");
        assert_eq!(strip_signature("no trailer here"), "no trailer here");
    }
}
