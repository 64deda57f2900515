use serde_json::{Map, Value};

use crate::{
    db::{
        models::{NewTool, Tool, UpdateTool, UserOwned, RESERVED_TOOL_COLUMNS},
        UserScopedClient,
    },
    errors::ApiError,
};

pub struct ToolDbService<'a> {
    pub db: &'a UserScopedClient,
}

impl<'a> ToolDbService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        ToolDbService { db }
    }

    /// Find the given tools among those visible to the current user (their own
    /// tools, plus public tools). Returns nothing when no IDs are requested.
    pub async fn find_visible(&self, tool_ids: &[i64]) -> Result<Vec<Tool>, ApiError> {
        if tool_ids.is_empty() {
            return Ok(Vec::new());
        }

        self.db
            .client()
            .from("tools")
            .or(&self.visibility_filter())
            .in_("id", tool_ids)
            .fetch()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed fetching tools: {e}")))
    }

    /// Find a tool by ID among the user's own tools and public tools
    pub async fn find_by_id(&self, tool_id: i64) -> Result<Tool, ApiError> {
        let tools: Vec<Tool> = self
            .db
            .client()
            .from("tools")
            .or(&self.visibility_filter())
            .eq("id", tool_id)
            .fetch()
            .await
            .map_err(|e| ApiError::not_found(format!("Tool not found: {e}")))?;

        tools
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Tool not found"))
    }

    pub async fn create(&self, tool: NewTool<'_>) -> Result<Tool, ApiError> {
        let definition = without_reserved_columns(tool.definition);
        let tool = NewTool {
            definition: &definition,
            ..tool
        };
        let created: Vec<Tool> = self
            .db
            .client()
            .from("tools")
            .insert(&UserOwned {
                user_id: self.db.user_id(),
                data: &tool,
            })
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to create tool: {e}")))?;

        created
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::bad_request("Failed to create tool"))
    }

    /// Update a tool owned by the current user
    pub async fn update(&self, tool_id: i64, data: UpdateTool<'_>) -> Result<Tool, ApiError> {
        let definition = data.definition.map(without_reserved_columns);
        let data = UpdateTool {
            definition: definition.as_ref(),
            ..data
        };
        if data.is_empty() {
            return Err(ApiError::bad_request("No tool fields to update"));
        }

        let updated: Vec<Tool> = self
            .db
            .client()
            .from("tools")
            .eq("id", tool_id)
            .eq("user_id", self.db.user_id())
            .update(&data)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to update tool: {e}")))?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Tool not found"))
    }

    pub async fn delete(&self, tool_id: i64) -> Result<i64, ApiError> {
        let deleted: Vec<Tool> = self
            .db
            .client()
            .from("tools")
            .eq("id", tool_id)
            .eq("user_id", self.db.user_id())
            .delete()
            .await
            .map_err(|e| ApiError::bad_request(format!("Error deleting tool {tool_id}: {e}")))?;

        match deleted.first() {
            Some(tool) => Ok(tool.id),
            None => Err(ApiError::bad_request(format!("Error deleting tool {tool_id}"))),
        }
    }

    fn visibility_filter(&self) -> String {
        format!("user_id.eq.{},is_public.eq.true", self.db.user_id())
    }
}

/// Copy of a tool definition without the keys that would overwrite the tool's
/// own columns once flattened into the row
fn without_reserved_columns(definition: &Map<String, Value>) -> Map<String, Value> {
    definition
        .iter()
        .filter(|(key, _)| {
            let reserved = RESERVED_TOOL_COLUMNS.contains(&key.as_str());
            if reserved {
                rocket::warn!("Ignoring reserved column `{}` in tool definition", key);
            }
            !reserved
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
