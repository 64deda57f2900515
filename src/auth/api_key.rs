use serde::Deserialize;
use uuid::Uuid;

use crate::{db::UserScopedClient, errors::ApiError, supabase::SupabaseClient};

/// Header carrying an API key
pub const API_KEY_HEADER: &str = "X-API-Key";

const AUTH_FAILED: &str = "An error occurred during authentication";

#[derive(Deserialize)]
struct ApiKeyOwner {
    user_id: Uuid,
}

/// Look up the owner of an API key and create a client scoped to them. Every
/// failure is reported with the same generic message, so callers can't tell
/// a malformed key from an unknown one.
pub async fn authenticate_with_api_key(
    client: &SupabaseClient,
    key: &str,
) -> Result<UserScopedClient, ApiError> {
    let owners: Vec<ApiKeyOwner> = client
        .from("api_keys")
        .select("user_id")
        .eq("key", key)
        .limit(2)
        .fetch()
        .await
        .map_err(|e| {
            rocket::error!("API key lookup failed: {}", e);
            ApiError::unauthorized(AUTH_FAILED)
        })?;

    let [owner] = owners.as_slice() else {
        rocket::warn!("API key authentication failed: {} matching keys", owners.len());
        return Err(ApiError::unauthorized(AUTH_FAILED));
    };

    match client.get_user_by_id(&owner.user_id).await {
        Ok(user) => Ok(UserScopedClient::new(client.clone(), user.into())),
        Err(e) => {
            rocket::error!("Failed to fetch API key owner {}: {}", owner.user_id, e);
            Err(ApiError::unauthorized(AUTH_FAILED))
        }
    }
}
