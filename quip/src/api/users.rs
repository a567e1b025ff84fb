//! User lookup endpoints.

use serde_json::Value;

use super::join_ids;
use crate::client::{into_array, with_query, ApiObject, QuipClient};
use crate::error::Result;

/// Returns the user corresponding to the client's access token.
pub async fn get_authenticated_user(client: &QuipClient) -> Result<ApiObject> {
    client.call_object("users/current", None).await
}

/// Returns a mapping from user ID to user for the given IDs.
pub async fn get_users(client: &QuipClient, ids: &[&str]) -> Result<ApiObject> {
    let path = with_query("users/", vec![("ids", join_ids(ids))]);
    client.call_object(&path, None).await
}

/// Returns the users in the authenticated user's contacts.
pub async fn get_contacts(client: &QuipClient) -> Result<Vec<Value>> {
    let path = "users/contacts";
    into_array(client.call(path, None).await?, path)
}
