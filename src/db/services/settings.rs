use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{db::UserScopedClient, errors::ApiError};

/// Read-only access to the `user_settings` table
pub struct SettingsDbService<'a> {
    pub db: &'a UserScopedClient,
}

#[derive(Deserialize)]
struct SettingsColumn {
    #[serde(alias = "general", alias = "tools")]
    value: Option<Map<String, Value>>,
}

impl<'a> SettingsDbService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        SettingsDbService { db }
    }

    /// The user's general settings, or an empty object if none are saved. Like
    /// `tools()`, this is the contents of the `general` column, not the
    /// `{"general": ...}` row wrapper.
    pub async fn general(&self) -> Result<Map<String, Value>, ApiError> {
        self.fetch_column("general").await
    }

    /// The user's tool settings, or an empty object if none are saved
    pub async fn tools(&self) -> Result<Map<String, Value>, ApiError> {
        self.fetch_column("tools").await
    }

    async fn fetch_column(&self, column: &str) -> Result<Map<String, Value>, ApiError> {
        let rows: Vec<SettingsColumn> = self
            .db
            .client()
            .from("user_settings")
            .select(column)
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| {
                rocket::error!("Failed to fetch user settings ({}): {}", column, e);
                ApiError::internal(format!(
                    "An error occurred while fetching user settings ({column}): {e}"
                ))
            })?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.value)
            .unwrap_or_default())
    }
}
