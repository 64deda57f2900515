use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A log line recorded while running a chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatLog {
    pub id: i64,
    pub chat_id: i64,
    pub message: String,
    pub level: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Chat ID as received from callers, which may send it as a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LogChatId {
    Id(i64),
    Text(String),
}

impl LogChatId {
    pub fn normalize(&self) -> Option<i64> {
        match self {
            LogChatId::Id(id) => Some(*id),
            LogChatId::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for LogChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogChatId::Id(id) => write!(f, "{id}"),
            LogChatId::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<i64> for LogChatId {
    fn from(id: i64) -> Self {
        LogChatId::Id(id)
    }
}

impl From<&str> for LogChatId {
    fn from(text: &str) -> Self {
        LogChatId::Text(text.to_owned())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatLog {
    pub chat_id: LogChatId,
    pub message: String,
    pub level: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Row written to the `chat_logs` table
#[derive(Serialize)]
pub(crate) struct ChatLogRow<'r> {
    pub chat_id: i64,
    pub message: &'r str,
    pub level: &'r str,
    pub metadata: Option<&'r serde_json::Value>,
}
