use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{
    db::{
        models::{Chat, ChatSourceType, ChatStatus, NewChat, UpdateChat, UserOwned},
        UserScopedClient,
    },
    errors::ApiError,
    supabase::SupabaseError,
};

pub struct ChatDbService<'a> {
    pub db: &'a UserScopedClient,
}

impl<'a> ChatDbService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        ChatDbService { db }
    }

    pub async fn find_all(&self) -> Result<Vec<Chat>, ApiError> {
        self.db
            .client()
            .from("chats")
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| {
                ApiError::bad_request(format!(
                    "Failed to get chats for user {}: {}",
                    self.db.user_id(),
                    e
                ))
            })
    }

    pub async fn find_by_id(&self, chat_id: i64) -> Result<Chat, ApiError> {
        let chats: Vec<Chat> = self
            .db
            .client()
            .from("chats")
            .eq("id", chat_id)
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| ApiError::not_found(format!("Chat not found: {e}")))?;

        chats
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Chat not found"))
    }

    pub async fn create(&self, chat: NewChat<'_>) -> Result<Chat, ApiError> {
        let created: Vec<Chat> = self
            .db
            .client()
            .from("chats")
            .insert(&UserOwned {
                user_id: self.db.user_id(),
                data: &chat,
            })
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to create chat: {e}")))?;

        created.into_iter().next().ok_or_else(|| {
            rocket::warn!("Chat insertion returned no rows");
            ApiError::bad_request("Failed to create chat")
        })
    }

    pub async fn update(&self, chat_id: i64, data: UpdateChat<'_>) -> Result<Chat, ApiError> {
        let updated: Vec<Chat> = self
            .db
            .client()
            .from("chats")
            .eq("id", chat_id)
            .eq("user_id", self.db.user_id())
            .update(&data)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to update chat: {e}")))?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Chat not found"))
    }

    pub async fn delete(&self, chat_id: i64) -> Result<i64, ApiError> {
        let deleted: Vec<Chat> = self
            .db
            .client()
            .from("chats")
            .eq("id", chat_id)
            .eq("user_id", self.db.user_id())
            .delete()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to delete chat: {e}")))?;

        match deleted.first() {
            Some(chat) => Ok(chat.id),
            None => Err(ApiError::bad_request(format!(
                "Failed to delete chat {chat_id}"
            ))),
        }
    }

    /// Move a chat to a new status. The write only applies when the chat is
    /// currently in one of the status's allowed predecessor states.
    pub async fn set_status(&self, chat_id: i64, status: ChatStatus) -> Result<Chat, ApiError> {
        let updated: Vec<Chat> = self
            .db
            .client()
            .from("chats")
            .eq("id", chat_id)
            .eq("user_id", self.db.user_id())
            .in_("status", status.allowed_predecessors())
            .update(&StatusChange { status })
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to set chat status: {e}")))?;

        if let Some(chat) = updated.into_iter().next() {
            return Ok(chat);
        }

        let current = self.find_by_id(chat_id).await?;
        Err(ApiError::bad_request(format!(
            "Failed to set chat status: cannot move from {} to {}",
            current.status, status
        )))
    }

    /// Resolve the project definition a chat was started from. Returns an empty
    /// object when the chat or its linked project/template doesn't exist.
    pub async fn fetch_source_metadata(&self, chat_id: i64) -> Result<Value, ApiError> {
        let not_found =
            |e: SupabaseError| ApiError::not_found(format!("Source metadata not found: {e}"));
        let client = self.db.client();

        let chats: Vec<ChatSource> = client
            .from("chats")
            .select("from_type,from_project,from_template")
            .eq("id", chat_id)
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(not_found)?;
        let Some(chat) = chats.into_iter().next() else {
            return Ok(empty_object());
        };

        let source = match (chat.from_type, chat.from_project, chat.from_template) {
            (Some(ChatSourceType::Project), Some(project_id), _) => client
                .from("projects")
                .eq("id", project_id)
                .fetch::<Value>()
                .await
                .map_err(not_found)?
                .into_iter()
                .next(),
            (Some(ChatSourceType::Template), _, Some(template_id)) => client
                .from("templates")
                .eq("id", template_id)
                .fetch::<Value>()
                .await
                .map_err(not_found)?
                .into_iter()
                .next()
                .and_then(|mut template| template.get_mut("project").map(Value::take))
                .filter(|project| !project.is_null()),
            _ => None,
        };

        Ok(source.unwrap_or_else(empty_object))
    }
}

#[derive(serde::Serialize)]
struct StatusChange {
    status: ChatStatus,
}

/// Chat columns needed to follow its source link. Unknown source types are
/// treated as missing.
#[derive(Deserialize)]
struct ChatSource {
    #[serde(default, deserialize_with = "lenient_source_type")]
    from_type: Option<ChatSourceType>,
    from_project: Option<i64>,
    from_template: Option<i64>,
}

fn lenient_source_type<'de, D>(deserializer: D) -> Result<Option<ChatSourceType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
