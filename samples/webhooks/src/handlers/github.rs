//! GitHub push webhooks: the initial zen ping plus master-branch commits.

use quip::{NewMessage, QuipClient};
use serde_json::Value;
use tracing::info;

use super::{user_for_email, AppState, HookQuery};

pub async fn handle(
    client: &QuipClient,
    state: &AppState,
    query: &HookQuery,
    payload: &Value,
) -> Result<(), quip::Error> {
    if let Some(zen) = payload.get("zen").and_then(Value::as_str) {
        let content = format!(
            "GitHub Webhook initialized.\nYour moment of GitHub zen: {}",
            zen
        );
        client
            .new_message(NewMessage {
                thread_id: &query.thread_id,
                content: &content,
                silent: true,
                ..Default::default()
            })
            .await?;
        return Ok(());
    }

    let Some(commits) = payload.get("commits").and_then(Value::as_array) else {
        return Ok(());
    };
    if commits.is_empty() {
        return Ok(());
    }
    if payload.get("ref").and_then(Value::as_str) != Some("refs/heads/master") {
        info!("Ignored non-master commits");
        return Ok(());
    }

    for commit in commits {
        let message = commit
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();
        let email = commit
            .pointer("/author/email")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let committer = user_for_email(client, state, &query.api_token, email).await;
        let url = commit.get("url").and_then(Value::as_str).unwrap_or_default();
        let content = format!(
            "*Commit by {}*\n\n{}\n{}",
            committer,
            reflow(message),
            shorten_commit_url(url)
        );
        client
            .new_message(NewMessage {
                thread_id: &query.thread_id,
                content: &content,
                silent: true,
                ..Default::default()
            })
            .await?;
    }
    Ok(())
}

/// Join hard-wrapped lines back into paragraphs, keeping blank lines and
/// list bullets intact.
fn reflow(message: &str) -> String {
    let chars: Vec<char> = message.chars().collect();
    let mut out = String::with_capacity(message.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' && i > 0 && chars[i - 1] != '\n' {
            if let Some(&next) = chars.get(i + 1) {
                if next != '\n' && next != '-' && next != '*' {
                    out.push(' ');
                    i += 1;
                    continue;
                }
            }
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Commit URLs end with a full 40-character sha; a short prefix is enough
/// for a chat message.
fn shorten_commit_url(url: &str) -> &str {
    url.get(..url.len().saturating_sub(30)).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflow_joins_wrapped_lines() {
        assert_eq!(reflow("fix the parser\nfor real this time"), "fix the parser for real this time");
    }

    #[test]
    fn test_reflow_keeps_paragraphs_and_bullets() {
        assert_eq!(
            reflow("summary\n\ndetails\n- one\n- two"),
            "summary\n\ndetails\n- one\n- two"
        );
    }

    #[test]
    fn test_shorten_commit_url_drops_most_of_the_sha() {
        let url = "https://github.com/acme/repo/commit/0123456789abcdef0123456789abcdef01234567";
        assert_eq!(
            shorten_commit_url(url),
            "https://github.com/acme/repo/commit/0123456789"
        );
    }

    #[test]
    fn test_shorten_commit_url_tolerates_short_input() {
        assert_eq!(shorten_commit_url("short"), "");
    }
}
