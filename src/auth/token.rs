use crate::{db::UserScopedClient, errors::ApiError, supabase::SupabaseClient};

/// Verify a Supabase access token and create a client scoped to its user
pub async fn authenticate_with_token(
    client: &SupabaseClient,
    access_token: &str,
) -> Result<UserScopedClient, ApiError> {
    let access_token = access_token.trim();
    if access_token.is_empty() {
        return Err(ApiError::unauthorized("Failed to authenticate"));
    }

    match client.get_user(access_token).await {
        Ok(user) => Ok(UserScopedClient::new(client.clone(), user.into())),
        Err(e) => {
            rocket::error!("Authentication error: {}", e);
            Err(ApiError::unauthorized("Failed to authenticate"))
        }
    }
}
