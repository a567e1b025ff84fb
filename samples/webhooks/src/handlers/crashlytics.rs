//! Crashlytics webhooks: the verification ping and issue-impact changes.

use quip::{NewMessage, QuipClient};
use serde_json::Value;

pub async fn handle(
    client: &QuipClient,
    thread_id: &str,
    payload: &Value,
) -> Result<(), quip::Error> {
    match payload.get("event").and_then(Value::as_str) {
        Some("verification") => {
            client
                .new_message(NewMessage {
                    thread_id,
                    content: "Crashlytics Webhook initialized.",
                    silent: true,
                    ..Default::default()
                })
                .await?;
            Ok(())
        }
        Some("issue_impact_change") => {
            let Some(issue) = payload.get("payload") else {
                return Ok(());
            };
            let content = format_issue(issue);
            client
                .new_message(NewMessage {
                    thread_id,
                    content: &content,
                    silent: true,
                    ..Default::default()
                })
                .await?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn format_issue(issue: &Value) -> String {
    let title = issue.get("title").and_then(Value::as_str).unwrap_or("?");
    let method = issue.get("method").and_then(Value::as_str).unwrap_or("?");
    let url = issue.get("url").and_then(Value::as_str).unwrap_or_default();
    let app_description = issue
        .pointer("/app/bundle_identifier")
        .and_then(Value::as_str)
        .map(|bundle| format!("In app {}\n", bundle))
        .unwrap_or_default();

    if issue.get("impact_level").and_then(Value::as_u64) == Some(1) {
        format!(
            "*New crash in {}*\n\nMethod: {}\n{}{}",
            title, method, app_description, url
        )
    } else {
        let crashes = issue
            .get("crashes_count")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let devices = issue
            .get("impacted_devices_count")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        format!(
            "*{} is up to {} crashes*\n\nMethod: {}\n{}{} devices affected.\n{}",
            title, crashes, method, app_description, devices, url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_new_crash() {
        let issue = json!({
            "title": "NullPointer",
            "method": "main()",
            "impact_level": 1,
            "url": "https://crashlytics.example/issue/1",
            "app": {"bundle_identifier": "com.acme.app"},
        });
        assert_eq!(
            format_issue(&issue),
            "*New crash in NullPointer*\n\nMethod: main()\nIn app com.acme.app\nhttps://crashlytics.example/issue/1"
        );
    }

    #[test]
    fn test_format_escalating_crash_without_app() {
        let issue = json!({
            "title": "OOM",
            "method": "load()",
            "impact_level": 2,
            "crashes_count": 120,
            "impacted_devices_count": 48,
            "url": "https://crashlytics.example/issue/2",
        });
        assert_eq!(
            format_issue(&issue),
            "*OOM is up to 120 crashes*\n\nMethod: load()\n48 devices affected.\nhttps://crashlytics.example/issue/2"
        );
    }
}
