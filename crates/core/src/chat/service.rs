//! Tax assistant conversations.

use std::future::Future;
use std::sync::Arc;

use cognitax_shared::types::UserId;
use tracing::{error, info};
use uuid::Uuid;

use super::error::ChatError;
use super::types::{ChatReply, ChatRequest, ChatRole, ChatTurn};
use crate::extraction::DocumentExtractor;
use crate::tax::TaxSummary;

/// How many of the user's transactions are counted into the context.
pub const CONTEXT_TRANSACTION_LIMIT: u64 = 50;

/// Longest history returned for one conversation.
pub const HISTORY_LIMIT: u64 = 1000;

/// Repository trait for chat persistence.
pub trait ChatRepository: Send + Sync {
    /// Store one turn.
    fn append_turn(&self, turn: &ChatTurn) -> impl Future<Output = Result<(), ChatError>> + Send;

    /// Turns of one conversation, oldest first, at most `limit`.
    fn history(
        &self,
        owner_id: UserId,
        session_id: &str,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<ChatTurn>, ChatError>> + Send;

    /// Number of the user's transactions, capped at `limit`.
    fn count_transactions(
        &self,
        owner_id: UserId,
        limit: u64,
    ) -> impl Future<Output = Result<u64, ChatError>> + Send;

    /// The user's most recent tax summary.
    fn latest_tax_summary(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Option<TaxSummary>, ChatError>> + Send;
}

/// Builds the assistant's system instruction around the user's context.
#[must_use]
pub fn system_instruction(transaction_count: u64, latest_tax: Option<&TaxSummary>) -> String {
    let latest = latest_tax
        .and_then(|tax| serde_json::to_string(tax).ok())
        .unwrap_or_else(|| "None".to_string());

    format!(
        "You are an expert Indian tax assistant helping with GST, ITR, TDS, and business tax queries.\n\
         Provide accurate, helpful advice based on Indian tax laws (2025).\n\n\
         User's Financial Context:\n\
         - Total Transactions: {transaction_count}\n\
         - Latest Tax Calculation: {latest}\n"
    )
}

/// Answers tax questions with the user's figures as context.
pub struct ChatService<R: ChatRepository, E: DocumentExtractor> {
    repo: Arc<R>,
    extractor: Arc<E>,
}

impl<R: ChatRepository, E: DocumentExtractor> ChatService<R, E> {
    /// Create a new chat service.
    #[must_use]
    pub const fn new(repo: Arc<R>, extractor: Arc<E>) -> Self {
        Self { repo, extractor }
    }

    /// Stores the question, asks the assistant and stores the answer.
    ///
    /// The question is kept even if the assistant fails.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyMessage`] for a blank question, or the
    /// generation or repository error.
    pub async fn send(&self, owner_id: UserId, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let session_id = request
            .session_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.repo
            .append_turn(&ChatTurn::new(
                owner_id,
                &session_id,
                ChatRole::User,
                message.to_string(),
            ))
            .await?;

        let count = self
            .repo
            .count_transactions(owner_id, CONTEXT_TRANSACTION_LIMIT)
            .await?;
        let latest = self.repo.latest_tax_summary(owner_id).await?;
        let instruction = system_instruction(count, latest.as_ref());

        let response = self
            .extractor
            .generate(message, None, Some(&instruction))
            .await
            .map_err(|e| {
                error!(%owner_id, session_id = %session_id, error = %e, "Chat generation failed");
                ChatError::from(e)
            })?;

        self.repo
            .append_turn(&ChatTurn::new(
                owner_id,
                &session_id,
                ChatRole::Assistant,
                response.clone(),
            ))
            .await?;

        info!(%owner_id, session_id = %session_id, "Chat turn answered");
        Ok(ChatReply {
            session_id,
            response,
        })
    }

    /// Returns a conversation, oldest turn first.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository query fails.
    pub async fn history(
        &self,
        owner_id: UserId,
        session_id: &str,
    ) -> Result<Vec<ChatTurn>, ChatError> {
        self.repo.history(owner_id, session_id, HISTORY_LIMIT).await
    }
}
