use tokio::task::JoinHandle;

use crate::{
    db::models::{ChatLog, ChatLogRow, NewChatLog},
    supabase::SupabaseClient,
};

/// Best-effort writer for the `chat_logs` table. Logging must never break the
/// calling workflow, so failures are reported as `None` instead of errors.
pub struct LogDbService<'a> {
    pub client: &'a SupabaseClient,
}

impl<'a> LogDbService<'a> {
    pub fn new(client: &'a SupabaseClient) -> Self {
        LogDbService { client }
    }

    /// Append a log entry, returning the stored row or `None` if anything
    /// went wrong (including a malformed chat ID).
    pub async fn add(&self, log: &NewChatLog) -> Option<ChatLog> {
        let Some(chat_id) = log.chat_id.normalize() else {
            rocket::error!("Failed to add log: invalid chat ID {}", log.chat_id);
            return None;
        };
        let row = ChatLogRow {
            chat_id,
            message: &log.message,
            level: &log.level,
            metadata: log.metadata.as_ref(),
        };

        match self.client.from("chat_logs").insert::<_, ChatLog>(&row).await {
            Ok(rows) => {
                let created = rows.into_iter().next();
                match &created {
                    Some(_) => rocket::debug!("Added log for chat {}", chat_id),
                    None => rocket::warn!("No response data from log insertion"),
                }
                created
            }
            Err(e) => {
                rocket::error!("Failed to add log for chat {}: {}", chat_id, e);
                None
            }
        }
    }
}

/// Spawns a detached task to append a log entry. The write continues even if
/// the caller is cancelled; awaiting the handle is optional.
pub fn spawn_log(client: &SupabaseClient, log: NewChatLog) -> JoinHandle<Option<ChatLog>> {
    let client = client.clone();
    tokio::spawn(async move { LogDbService::new(&client).add(&log).await })
}
