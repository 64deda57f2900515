use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub from_type: ChatSourceType,
    #[serde(default)]
    pub from_project: Option<i64>,
    #[serde(default)]
    pub from_template: Option<i64>,
    #[serde(default)]
    pub status: ChatStatus,
    pub created_at: DateTime<Utc>,
}

/// Where a chat's flow definition comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSourceType {
    Project,
    Template,
}

/// Lifecycle state of a chat
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    #[default]
    Ready,
    Running,
    WaitForHumanInput,
    Completed,
    Aborted,
    Failed,
}

impl ChatStatus {
    pub const ALL: [ChatStatus; 6] = [
        ChatStatus::Ready,
        ChatStatus::Running,
        ChatStatus::WaitForHumanInput,
        ChatStatus::Completed,
        ChatStatus::Aborted,
        ChatStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Ready => "ready",
            ChatStatus::Running => "running",
            ChatStatus::WaitForHumanInput => "wait_for_human_input",
            ChatStatus::Completed => "completed",
            ChatStatus::Aborted => "aborted",
            ChatStatus::Failed => "failed",
        }
    }

    /// States a chat may be in when moving to this state
    pub fn allowed_predecessors(&self) -> &'static [ChatStatus] {
        use ChatStatus::*;
        match self {
            Ready => &[Ready, Completed, Aborted, Failed],
            Running => &Self::ALL,
            WaitForHumanInput => &[Running, WaitForHumanInput],
            Completed => &[Running, WaitForHumanInput, Completed],
            Aborted => &[Ready, Running, WaitForHumanInput, Aborted],
            Failed => &[Ready, Running, WaitForHumanInput, Failed],
        }
    }

    pub fn can_transition_to(&self, next: ChatStatus) -> bool {
        next.allowed_predecessors().contains(self)
    }
}

impl fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid chat status: {0}")]
pub struct InvalidChatStatus(pub String);

impl FromStr for ChatStatus {
    type Err = InvalidChatStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidChatStatus(s.to_owned()))
    }
}

#[derive(Debug, Serialize)]
pub struct NewChat<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'r str>,
    pub from_type: ChatSourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_project: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_template: Option<i64>,
}

/// Partial chat update. Status changes go through `ChatDbService::set_status`.
#[derive(Debug, Default, Serialize)]
pub struct UpdateChat<'r> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'r str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_project: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_template: Option<i64>,
}
