//! Folder CRUD and membership endpoints.

use serde_json::{json, Value};

use super::{join_ids, opt_str};
use crate::client::{with_query, ApiObject, QuipClient};
use crate::error::Result;

/// Folder colors, numbered as the wire format expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderColor {
    Manila = 0,
    Red = 1,
    Orange = 2,
    Green = 3,
    Blue = 4,
}

/// Options for [`new_folder`].
#[derive(Debug, Default)]
pub struct NewFolder<'a> {
    pub title: &'a str,
    pub parent_id: Option<&'a str>,
    pub color: Option<FolderColor>,
    pub member_ids: &'a [&'a str],
}

/// Options for [`update_folder`].
#[derive(Debug, Default)]
pub struct UpdateFolder<'a> {
    pub folder_id: &'a str,
    pub title: Option<&'a str>,
    pub color: Option<FolderColor>,
}

fn color_param(color: Option<FolderColor>) -> Value {
    color.map_or(Value::Null, |c| json!(c as u8))
}

/// Returns a mapping from folder ID to folder for the given IDs.
pub async fn get_folders(client: &QuipClient, ids: &[&str]) -> Result<ApiObject> {
    let path = with_query("folders/", vec![("ids", join_ids(ids))]);
    client.call_object(&path, None).await
}

pub async fn new_folder(client: &QuipClient, options: NewFolder<'_>) -> Result<ApiObject> {
    let params = vec![
        ("title", json!(options.title)),
        ("parent_id", opt_str(options.parent_id)),
        ("color", color_param(options.color)),
        ("member_ids", join_ids(options.member_ids)),
    ];
    client.call_object("folders/new", Some(params)).await
}

pub async fn update_folder(client: &QuipClient, options: UpdateFolder<'_>) -> Result<ApiObject> {
    let params = vec![
        ("folder_id", json!(options.folder_id)),
        ("title", opt_str(options.title)),
        ("color", color_param(options.color)),
    ];
    client.call_object("folders/update", Some(params)).await
}

/// Adds the given users to the given folder.
pub async fn add_folder_members(
    client: &QuipClient,
    folder_id: &str,
    member_ids: &[&str],
) -> Result<ApiObject> {
    let params = vec![
        ("folder_id", json!(folder_id)),
        ("member_ids", join_ids(member_ids)),
    ];
    client.call_object("folders/add-members", Some(params)).await
}

/// Removes the given users from the given folder.
pub async fn remove_folder_members(
    client: &QuipClient,
    folder_id: &str,
    member_ids: &[&str],
) -> Result<ApiObject> {
    let params = vec![
        ("folder_id", json!(folder_id)),
        ("member_ids", join_ids(member_ids)),
    ];
    client
        .call_object("folders/remove-members", Some(params))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::form_fields;

    #[test]
    fn test_folder_color_wire_values() {
        assert_eq!(FolderColor::Manila as u8, 0);
        assert_eq!(FolderColor::Blue as u8, 4);
    }

    #[test]
    fn test_new_folder_omits_unset_options() {
        let options = NewFolder {
            title: "Reports",
            ..Default::default()
        };
        let fields = form_fields(vec![
            ("title", json!(options.title)),
            ("parent_id", opt_str(options.parent_id)),
            ("color", color_param(options.color)),
            ("member_ids", join_ids(options.member_ids)),
        ]);
        assert_eq!(fields, vec![("title".to_string(), "Reports".to_string())]);
    }
}
