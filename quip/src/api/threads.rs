//! Thread retrieval, membership, and document creation/editing endpoints.

use serde_json::{json, Value};

use super::{join_ids, opt_str, opt_u64};
use crate::client::{with_query, ApiObject, QuipClient};
use crate::error::Result;

/// Document edit operations, numbered as the wire format expects. The
/// relative operations require a `section_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Append = 0,
    Prepend = 1,
    AfterSection = 2,
    BeforeSection = 3,
    ReplaceSection = 4,
    DeleteSection = 5,
}

/// Source format for document content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentFormat {
    #[default]
    Html,
    Markdown,
}

impl DocumentFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "markdown",
        }
    }
}

/// Options for [`get_recent_threads`].
#[derive(Debug, Default)]
pub struct RecentThreads {
    /// Paging cursor: only threads updated before this microsecond timestamp.
    pub max_updated_usec: Option<u64>,
    pub count: Option<u32>,
}

/// Options for [`new_document`].
#[derive(Debug, Default)]
pub struct NewDocument<'a> {
    pub content: &'a str,
    pub format: Option<DocumentFormat>,
    pub title: Option<&'a str>,
    /// To create the document inside a folder, include the folder ID here.
    pub member_ids: &'a [&'a str],
}

/// Options for [`edit_document`].
#[derive(Debug, Default)]
pub struct EditDocument<'a> {
    pub thread_id: &'a str,
    pub content: &'a str,
    pub operation: Option<Operation>,
    pub format: Option<DocumentFormat>,
    pub section_id: Option<&'a str>,
}

/// Returns a mapping from thread ID to thread for the given IDs.
pub async fn get_threads(client: &QuipClient, ids: &[&str]) -> Result<ApiObject> {
    let path = with_query("threads/", vec![("ids", join_ids(ids))]);
    client.call_object(&path, None).await
}

/// Returns the recently updated threads for the authenticated user.
pub async fn get_recent_threads(
    client: &QuipClient,
    options: RecentThreads,
) -> Result<ApiObject> {
    let path = with_query(
        "threads/recent",
        vec![
            ("max_updated_usec", opt_u64(options.max_updated_usec)),
            ("count", options.count.map_or(Value::Null, |c| json!(c))),
        ],
    );
    client.call_object(&path, None).await
}

/// Adds the given folder or user IDs to the given thread.
pub async fn add_thread_members(
    client: &QuipClient,
    thread_id: &str,
    member_ids: &[&str],
) -> Result<ApiObject> {
    let params = vec![
        ("thread_id", json!(thread_id)),
        ("member_ids", join_ids(member_ids)),
    ];
    client.call_object("threads/add-members", Some(params)).await
}

/// Removes the given folder or user IDs from the given thread.
pub async fn remove_thread_members(
    client: &QuipClient,
    thread_id: &str,
    member_ids: &[&str],
) -> Result<ApiObject> {
    let params = vec![
        ("thread_id", json!(thread_id)),
        ("member_ids", join_ids(member_ids)),
    ];
    client
        .call_object("threads/remove-members", Some(params))
        .await
}

pub async fn new_document(client: &QuipClient, options: NewDocument<'_>) -> Result<ApiObject> {
    let params = vec![
        ("content", json!(options.content)),
        ("format", opt_str(options.format.map(DocumentFormat::as_str))),
        ("title", opt_str(options.title)),
        ("member_ids", join_ids(options.member_ids)),
    ];
    client
        .call_object("threads/new-document", Some(params))
        .await
}

/// Edits the given document, adding the given content at `operation`.
///
/// `Append` is the wire default and is therefore omitted from the request,
/// like every other zero-valued parameter.
pub async fn edit_document(client: &QuipClient, options: EditDocument<'_>) -> Result<ApiObject> {
    let params = vec![
        ("thread_id", json!(options.thread_id)),
        ("content", json!(options.content)),
        (
            "location",
            options.operation.map_or(Value::Null, |op| json!(op as u8)),
        ),
        ("format", opt_str(options.format.map(DocumentFormat::as_str))),
        ("section_id", opt_str(options.section_id)),
    ];
    client
        .call_object("threads/edit-document", Some(params))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_wire_values() {
        assert_eq!(Operation::Append as u8, 0);
        assert_eq!(Operation::AfterSection as u8, 2);
        assert_eq!(Operation::DeleteSection as u8, 5);
    }

    #[test]
    fn test_document_format_strings() {
        assert_eq!(DocumentFormat::Html.as_str(), "html");
        assert_eq!(DocumentFormat::Markdown.as_str(), "markdown");
    }
}
