use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request,
};

use crate::{
    auth::{authenticate_with_api_key, authenticate_with_token, API_KEY_HEADER},
    db::{models::UserIdentity, UserScopedClient},
    errors::ApiError,
    supabase::SupabaseClient,
};

/// Request guard / middleware to ensure a logged-in user. Authenticates with
/// the bearer token if present, otherwise with the API key header. A fresh
/// client is built for every request, and reused by all guards of that request.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserScopedClient {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cached = req
            .local_cache_async(async { authenticate_request(req).await })
            .await;

        match cached {
            Ok(user_client) => Outcome::Success(user_client.clone()),
            Err((status, e)) => Outcome::Error((*status, e.clone())),
        }
    }
}

async fn authenticate_request(req: &Request<'_>) -> Result<UserScopedClient, (Status, ApiError)> {
    let Some(client) = req.rocket().state::<SupabaseClient>() else {
        rocket::error!("Auth guard: Supabase client not initialized");
        return Err((
            Status::InternalServerError,
            ApiError::internal("Server error"),
        ));
    };

    let result = if let Some(auth_header) = req.headers().get_one("Authorization") {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) => authenticate_with_token(client, token).await,
            None => Err(ApiError::unauthorized("Invalid authorization header")),
        }
    } else if let Some(api_key) = req.headers().get_one(API_KEY_HEADER) {
        authenticate_with_api_key(client, api_key).await
    } else {
        Err(ApiError::unauthorized("Unauthorized"))
    };

    result.map_err(|e| (Status::Unauthorized, e))
}

/// Request guard to get the identity of the logged-in user.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserIdentity {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let user_client = try_outcome!(req.guard::<UserScopedClient>().await);
        Outcome::Success(user_client.identity().clone())
    }
}
