//! Thread message endpoints.

use serde_json::{json, Value};

use super::{opt_str, opt_u64};
use crate::client::{into_array, with_query, ApiObject, QuipClient};
use crate::error::Result;

/// Paging options for [`get_messages`]. The maximum count is 100.
#[derive(Debug, Default)]
pub struct MessageOptions {
    pub max_updated_usec: Option<u64>,
    pub count: Option<u32>,
}

/// Options for [`new_message`]. `content` is plain text, not HTML.
#[derive(Debug, Default)]
pub struct NewMessage<'a> {
    pub thread_id: &'a str,
    pub content: &'a str,
    /// Suppress notifications for this message.
    pub silent: bool,
    pub frame: Option<&'a str>,
    pub parts: Option<&'a str>,
    /// Blob URLs to attach, uploaded beforehand via the blob endpoints.
    pub attachments: &'a [&'a str],
    pub annotation_id: Option<&'a str>,
    pub section_id: Option<&'a str>,
    /// Canned replies offered to thread members alongside the message.
    pub suggested_responses: Option<&'a str>,
    /// Deduplication key from an external service, e.g. an email Message-Id.
    pub service_id: Option<&'a str>,
}

/// Returns the most recent messages for the given thread, newest first.
pub async fn get_messages(
    client: &QuipClient,
    thread_id: &str,
    options: MessageOptions,
) -> Result<Vec<Value>> {
    let path = with_query(
        &format!("messages/{}", thread_id),
        vec![
            ("max_updated_usec", opt_u64(options.max_updated_usec)),
            ("count", options.count.map_or(Value::Null, |c| json!(c))),
        ],
    );
    into_array(client.call(&path, None).await?, &path)
}

pub async fn new_message(client: &QuipClient, options: NewMessage<'_>) -> Result<ApiObject> {
    let params = vec![
        ("thread_id", json!(options.thread_id)),
        ("frame", opt_str(options.frame)),
        ("content", json!(options.content)),
        ("parts", opt_str(options.parts)),
        ("attachments", json!(options.attachments.join(","))),
        ("silent", if options.silent { json!(1) } else { Value::Null }),
        ("annotation_id", opt_str(options.annotation_id)),
        ("section_id", opt_str(options.section_id)),
        ("suggested_responses", opt_str(options.suggested_responses)),
        ("service_id", opt_str(options.service_id)),
    ];
    client.call_object("messages/new", Some(params)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::form_fields;

    #[test]
    fn test_suggested_responses_follow_the_falsy_rule() {
        let absent = form_fields(vec![("suggested_responses", opt_str(None))]);
        assert!(absent.is_empty());

        let present = form_fields(vec![(
            "suggested_responses",
            opt_str(Some("Ship it,Hold off")),
        )]);
        assert_eq!(
            present,
            vec![(
                "suggested_responses".to_string(),
                "Ship it,Hold off".to_string(),
            )]
        );
    }

    #[test]
    fn test_silent_encodes_as_one_or_not_at_all() {
        let on = form_fields(vec![("silent", json!(1))]);
        assert_eq!(on, vec![("silent".to_string(), "1".to_string())]);

        let off = form_fields(vec![("silent", Value::Null)]);
        assert!(off.is_empty());
    }
}
