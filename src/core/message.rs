use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting seeded as the first assistant message of every session.
pub const DEFAULT_GREETING: &str = "Hi! I'm your sales analytics assistant. I have access to the \
sales database. Ask me about revenue, trends, best-selling products, average ticket and more!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One conversation entry. Fields are private so a message cannot change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl Message {
    pub fn new_user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into())
    }

    pub fn new_assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into())
    }

    fn new(role: MessageRole, content: String) -> Self {
        Self {
            role,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
