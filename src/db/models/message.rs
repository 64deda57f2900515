use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message in a chat. Messages are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: i64,
    #[serde(default, skip_serializing)]
    pub user_id: Option<Uuid>,
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NewChatMessage<'r> {
    pub role: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'r str>,
    pub content: &'r str,
}

/// Row written to the `chat_messages` table
#[derive(Serialize)]
pub(crate) struct ChatMessageRow<'r> {
    pub chat_id: i64,
    #[serde(flatten)]
    pub message: &'r NewChatMessage<'r>,
}
