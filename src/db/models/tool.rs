use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tool definition. Tools are visible to their owner, and to every user
/// when marked public.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Remaining columns of the tool definition (code, variables, etc.)
    #[serde(flatten)]
    pub definition: serde_json::Map<String, serde_json::Value>,
}

/// Row columns a tool definition may not set. They are dropped from the
/// definition before it is flattened into the row.
pub const RESERVED_TOOL_COLUMNS: [&str; 7] = [
    "id",
    "user_id",
    "name",
    "description",
    "is_public",
    "created_at",
    "updated_at",
];

#[derive(Debug, Serialize)]
pub struct NewTool<'r> {
    pub name: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'r str>,
    pub is_public: bool,
    #[serde(flatten)]
    pub definition: &'r serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateTool<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(flatten)]
    pub definition: Option<&'r serde_json::Map<String, serde_json::Value>>,
}

impl UpdateTool<'_> {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.definition.is_none_or(|definition| definition.is_empty())
    }
}
