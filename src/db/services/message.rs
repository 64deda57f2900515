use crate::{
    db::{
        models::{ChatMessage, ChatMessageRow, NewChatMessage, UserOwned},
        services::ChatDbService,
        UserScopedClient,
    },
    errors::ApiError,
};

pub struct MessageDbService<'a> {
    pub db: &'a UserScopedClient,
}

impl<'a> MessageDbService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        MessageDbService { db }
    }

    /// All messages of a chat written by the current user
    pub async fn find_by_chat(&self, chat_id: i64) -> Result<Vec<ChatMessage>, ApiError> {
        self.db
            .client()
            .from("chat_messages")
            .eq("chat_id", chat_id)
            .eq("user_id", self.db.user_id())
            .fetch()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed fetching messages: {e}")))
    }

    /// Append a message to one of the current user's chats
    pub async fn add(
        &self,
        chat_id: i64,
        message: &NewChatMessage<'_>,
    ) -> Result<ChatMessage, ApiError> {
        ChatDbService::new(self.db).find_by_id(chat_id).await?;
        rocket::debug!("Adding message to chat {}", chat_id);
        let row = ChatMessageRow { chat_id, message };
        let created: Vec<ChatMessage> = self
            .db
            .client()
            .from("chat_messages")
            .insert(&UserOwned {
                user_id: self.db.user_id(),
                data: &row,
            })
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to add message: {e}")))?;

        created.into_iter().next().ok_or_else(|| {
            ApiError::bad_request("Failed to add message: adding message returned no data")
        })
    }
}
