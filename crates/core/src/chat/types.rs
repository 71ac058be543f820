//! Chat types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cognitax_shared::types::{ChatTurnId, UserId};
use serde::{Deserialize, Serialize};

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The signed-in user.
    User,
    /// The tax assistant.
    Assistant,
}

impl ChatRole {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(format!("unknown chat role '{other}'")),
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Turn ID.
    pub id: ChatTurnId,
    /// Owning user.
    pub owner_id: UserId,
    /// Conversation the turn belongs to.
    pub session_id: String,
    /// Author.
    pub role: ChatRole,
    /// Message text.
    pub message: String,
    /// When the turn was stored.
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// A new turn stamped now.
    #[must_use]
    pub fn new(owner_id: UserId, session_id: &str, role: ChatRole, message: String) -> Self {
        Self {
            id: ChatTurnId::new(),
            owner_id,
            session_id: session_id.to_string(),
            role,
            message,
            created_at: Utc::now(),
        }
    }
}

/// A question for the assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Question text.
    #[serde(default)]
    pub message: String,
    /// Existing conversation, or `None` to start one.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// The assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    /// Conversation the answer belongs to.
    pub session_id: String,
    /// Answer text.
    pub response: String,
}
