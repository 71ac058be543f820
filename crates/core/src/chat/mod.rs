//! Tax assistant conversations.
//!
//! Each question is answered by a text-only generation call whose system
//! instruction carries the user's transaction count and latest tax summary.

mod error;
mod service;
mod types;

pub use error::ChatError;
pub use service::{
    CONTEXT_TRANSACTION_LIMIT, ChatRepository, ChatService, HISTORY_LIMIT, system_instruction,
};
pub use types::{ChatReply, ChatRequest, ChatRole, ChatTurn};
