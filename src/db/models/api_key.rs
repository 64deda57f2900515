use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub key: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct NewApiKey<'r> {
    pub name: Option<&'r str>,
    /// Key value to store. A random key is generated when not given.
    pub key: Option<&'r str>,
}

/// Row written to the `api_keys` table
#[derive(Serialize)]
pub(crate) struct ApiKeyRow<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'r str>,
    pub key: &'r str,
}
