//! # Service Trait
//!
//! Trait seam over the batch accessors, enabling dependency injection and
//! mocking in tests. The singular accessors are provided methods: they call
//! the plural accessor with a one-element id list and project the single
//! result out of the returned mapping, so any implementation gets them for
//! free.

use async_trait::async_trait;
use serde_json::Value;

use crate::api;
use crate::client::{ApiObject, QuipClient};
use crate::error::Result;

#[async_trait]
pub trait QuipApi: Send + Sync {
    /// Returns a mapping from user ID to user for the given IDs.
    async fn get_users(&self, ids: &[&str]) -> Result<ApiObject>;

    /// Returns a mapping from folder ID to folder for the given IDs.
    async fn get_folders(&self, ids: &[&str]) -> Result<ApiObject>;

    /// Returns a mapping from thread ID to thread for the given IDs.
    async fn get_threads(&self, ids: &[&str]) -> Result<ApiObject>;

    /// Returns the user with the given ID, or `None` if the API did not
    /// include it in the batch response.
    async fn get_user(&self, id: &str) -> Result<Option<ApiObject>> {
        let mut users = self.get_users(&[id]).await?;
        Ok(take_object(&mut users, id))
    }

    /// Returns the folder with the given ID.
    async fn get_folder(&self, id: &str) -> Result<Option<ApiObject>> {
        let mut folders = self.get_folders(&[id]).await?;
        Ok(take_object(&mut folders, id))
    }

    /// Returns the thread with the given ID.
    async fn get_thread(&self, id: &str) -> Result<Option<ApiObject>> {
        let mut threads = self.get_threads(&[id]).await?;
        Ok(take_object(&mut threads, id))
    }
}

fn take_object(mapping: &mut ApiObject, id: &str) -> Option<ApiObject> {
    match mapping.remove(id) {
        Some(Value::Object(object)) => Some(object),
        _ => None,
    }
}

#[async_trait]
impl QuipApi for QuipClient {
    async fn get_users(&self, ids: &[&str]) -> Result<ApiObject> {
        api::users::get_users(self, ids).await
    }

    async fn get_folders(&self, ids: &[&str]) -> Result<ApiObject> {
        api::folders::get_folders(self, ids).await
    }

    async fn get_threads(&self, ids: &[&str]) -> Result<ApiObject> {
        api::threads::get_threads(self, ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A canned batch accessor: the singular getters must work against any
    /// implementation, not just the HTTP client.
    struct CannedApi {
        users: ApiObject,
    }

    #[async_trait]
    impl QuipApi for CannedApi {
        async fn get_users(&self, _ids: &[&str]) -> Result<ApiObject> {
            Ok(self.users.clone())
        }

        async fn get_folders(&self, _ids: &[&str]) -> Result<ApiObject> {
            Ok(ApiObject::new())
        }

        async fn get_threads(&self, _ids: &[&str]) -> Result<ApiObject> {
            Ok(ApiObject::new())
        }
    }

    fn canned() -> CannedApi {
        let users = match json!({"UVWXYZabcde": {"name": "X"}}) {
            Value::Object(object) => object,
            _ => unreachable!(),
        };
        CannedApi { users }
    }

    #[tokio::test]
    async fn test_get_user_projects_single_result() {
        let api = canned();
        let user = api.get_user("UVWXYZabcde").await.unwrap().unwrap();
        assert_eq!(user.get("name"), Some(&json!("X")));
    }

    #[tokio::test]
    async fn test_get_user_absent_id_is_none() {
        let api = canned();
        assert!(api.get_user("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_folder_over_empty_batch_is_none() {
        let api = canned();
        assert!(api.get_folder("FLDRabcdefg").await.unwrap().is_none());
    }
}
