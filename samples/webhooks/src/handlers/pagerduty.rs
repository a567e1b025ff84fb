//! PagerDuty webhooks: incident trigger and resolve events.

use quip::{NewMessage, QuipClient};
use serde_json::Value;

use super::{user_for_email, AppState, HookQuery};

pub async fn handle(
    client: &QuipClient,
    state: &AppState,
    query: &HookQuery,
    payload: &Value,
) -> Result<(), quip::Error> {
    let Some(messages) = payload.get("messages").and_then(Value::as_array) else {
        return Ok(());
    };

    for message in messages {
        let Some(incident) = message.pointer("/data/incident") else {
            continue;
        };
        let url = incident
            .get("html_url")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let title = incident
            .pointer("/trigger_summary_data/subject")
            .and_then(Value::as_str)
            .unwrap_or("?");

        match message.get("type").and_then(Value::as_str) {
            Some("incident.trigger") => {
                let assignee = match incident
                    .pointer("/assigned_to_user/email")
                    .and_then(Value::as_str)
                {
                    Some(email) => user_for_email(client, state, &query.api_token, email).await,
                    None => "nobody".to_string(),
                };
                let content = trigger_message(title, &assignee, url);
                client
                    .new_message(NewMessage {
                        thread_id: &query.thread_id,
                        content: &content,
                        // Fresh pages should actually notify people.
                        silent: false,
                        ..Default::default()
                    })
                    .await?;
            }
            Some("incident.resolve") => {
                let resolver = match incident
                    .pointer("/resolved_by_user/email")
                    .and_then(Value::as_str)
                {
                    Some(email) => user_for_email(client, state, &query.api_token, email).await,
                    None => "nobody".to_string(),
                };
                let content = resolve_message(title, &resolver, url);
                client
                    .new_message(NewMessage {
                        thread_id: &query.thread_id,
                        content: &content,
                        silent: true,
                        ..Default::default()
                    })
                    .await?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn trigger_message(title: &str, assignee: &str, url: &str) -> String {
    format!(
        "New PagerDuty incident '{}' assigned to {} \n{}",
        title, assignee, url
    )
}

fn resolve_message(title: &str, resolver: &str, url: &str) -> String {
    format!(
        "PagerDuty incident '{}' resolved by {} \n{}",
        title, resolver, url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_message() {
        assert_eq!(
            trigger_message("DB down", "https://quip.com/U1", "https://pd.example/i/1"),
            "New PagerDuty incident 'DB down' assigned to https://quip.com/U1 \nhttps://pd.example/i/1"
        );
    }

    #[test]
    fn test_resolve_message() {
        assert_eq!(
            resolve_message("DB down", "nobody", "https://pd.example/i/1"),
            "PagerDuty incident 'DB down' resolved by nobody \nhttps://pd.example/i/1"
        );
    }
}
