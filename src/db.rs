pub mod models;
pub mod services;

use uuid::Uuid;

use crate::{db::models::UserIdentity, supabase::SupabaseClient};

/// Data client scoped to one authenticated user. It can only be created by
/// authenticating (see [crate::auth]), and the identity it carries never
/// changes, so one instance must serve a single request or user.
#[derive(Debug, Clone)]
pub struct UserScopedClient {
    client: SupabaseClient,
    identity: UserIdentity,
}

impl UserScopedClient {
    pub(crate) fn new(client: SupabaseClient, identity: UserIdentity) -> Self {
        Self { client, identity }
    }

    pub fn user_id(&self) -> &Uuid {
        &self.identity.id
    }

    /// Identity captured when the client was authenticated
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// The underlying backend client (not scoped to the user)
    pub fn client(&self) -> &SupabaseClient {
        &self.client
    }

    /// Fetch the latest identity data of the current user. Never fails the
    /// caller's flow: errors are logged and reported as `None`.
    pub async fn current_user(&self) -> Option<UserIdentity> {
        match self.client.get_user_by_id(self.user_id()).await {
            Ok(user) => Some(user.into()),
            Err(e) => {
                rocket::warn!("Failed to fetch user info for {}: {}", self.user_id(), e);
                None
            }
        }
    }
}
