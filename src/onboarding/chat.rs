//! Interview chat log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::TwinUpdate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in the interview log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// The update applied by the answer this assistant message follows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_update: Option<TwinUpdate>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into(), None)
    }

    /// Assistant prompt annotated with the update that preceded it.
    pub fn assistant_with_update(content: impl Into<String>, update: TwinUpdate) -> Self {
        Self::new(Role::Assistant, content.into(), Some(update))
    }

    fn new(role: Role, content: String, extracted_update: Option<TwinUpdate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            extracted_update,
        }
    }
}
