use rand::RngCore;

use crate::{
    db::{
        models::{ApiKey, ApiKeyRow, NewApiKey, UserOwned},
        UserScopedClient,
    },
    errors::ApiError,
};

pub const API_KEY_PREFIX: &str = "agentok-";

/// Generate a new random API key string
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

pub struct ApiKeyDbService<'a> {
    pub db: &'a UserScopedClient,
}

impl<'a> ApiKeyDbService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        ApiKeyDbService { db }
    }

    pub async fn create(&self, api_key: NewApiKey<'_>) -> Result<ApiKey, ApiError> {
        let generated;
        let key = match api_key.key {
            Some(key) => key,
            None => {
                generated = generate_api_key();
                &generated
            }
        };
        let row = ApiKeyRow {
            name: api_key.name,
            key,
        };

        let created: Vec<ApiKey> = self
            .db
            .client()
            .from("api_keys")
            .insert(&UserOwned {
                user_id: self.db.user_id(),
                data: &row,
            })
            .await
            .map_err(|e| {
                rocket::error!("Failed to create API key: {}", e);
                ApiError::bad_request("Failed to create API key")
            })?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::bad_request("Failed to create API key"))
    }

    pub async fn find_all(&self) -> Result<Vec<ApiKey>, ApiError> {
        self.db
            .client()
            .from("api_keys")
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| {
                rocket::error!("Failed to retrieve API keys: {}", e);
                ApiError::bad_request("Failed to retrieve API keys")
            })
    }

    pub async fn find_by_id(&self, api_key_id: i64) -> Result<ApiKey, ApiError> {
        let keys: Vec<ApiKey> = self
            .db
            .client()
            .from("api_keys")
            .eq("id", api_key_id)
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| {
                rocket::error!("Failed to retrieve API key: {}", e);
                ApiError::bad_request("Failed to retrieve API key")
            })?;

        keys.into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("API key not found"))
    }

    /// Delete an API key owned by the current user. Fails when no key matched,
    /// whether it doesn't exist or belongs to someone else.
    pub async fn delete(&self, api_key_id: i64) -> Result<i64, ApiError> {
        let deleted: Vec<ApiKey> = self
            .db
            .client()
            .from("api_keys")
            .eq("id", api_key_id)
            .eq("user_id", self.db.user_id())
            .delete()
            .await
            .map_err(|e| {
                rocket::error!("Failed to delete API key: {}", e);
                ApiError::bad_request("Failed to delete API key")
            })?;

        match deleted.first() {
            Some(key) => Ok(key.id),
            None => Err(ApiError::bad_request("Failed to delete API key")),
        }
    }
}
