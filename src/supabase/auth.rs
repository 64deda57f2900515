use serde::Deserialize;
use uuid::Uuid;

use super::{check_response, SupabaseClient, SupabaseError};

/// User record returned by the Supabase auth service
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl SupabaseClient {
    /// Verify a user's access token (JWT) and return the user it belongs to
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let response = self
            .http
            .get(self.url("/auth/v1/user"))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }

    /// Look up a user by ID using the admin API
    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<AuthUser, SupabaseError> {
        let request = self
            .http
            .get(self.url(&format!("/auth/v1/admin/users/{user_id}")));
        let response = self.service_request(request).send().await?;

        Ok(check_response(response).await?.json().await?)
    }
}
