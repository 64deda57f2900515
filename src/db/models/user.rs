use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::supabase::AuthUser;

/// Identity of an authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: Option<String>,
    pub app_metadata: serde_json::Value,
    pub user_metadata: serde_json::Value,
}

impl From<AuthUser> for UserIdentity {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            app_metadata: user.app_metadata,
            user_metadata: user.user_metadata,
        }
    }
}
