//! Chat repository: stored conversation turns plus the context the
//! assistant needs.

use cognitax_core::chat::{ChatError, ChatRepository as ChatRepoTrait, ChatRole, ChatTurn};
use cognitax_core::tax::TaxSummary;
use cognitax_shared::types::{ChatTurnId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::error::RepositoryError;
use super::tax_summary::TaxSummaryRepository;
use super::transaction::TransactionRepository;
use crate::entities::chat_turns;

/// Chat repository implementation.
#[derive(Debug, Clone)]
pub struct ChatTurnRepository {
    db: DatabaseConnection,
}

impl ChatTurnRepository {
    /// Create a new chat repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ChatRepoTrait for ChatTurnRepository {
    async fn append_turn(&self, turn: &ChatTurn) -> Result<(), ChatError> {
        chat_turns::ActiveModel {
            id: Set(turn.id.into_inner()),
            user_id: Set(turn.owner_id.into_inner()),
            session_id: Set(turn.session_id.clone()),
            role: Set(turn.role.as_str().to_string()),
            message: Set(turn.message.clone()),
            created_at: Set(turn.created_at.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ChatError::repository(e.to_string()))?;

        Ok(())
    }

    async fn history(
        &self,
        owner_id: UserId,
        session_id: &str,
        limit: u64,
    ) -> Result<Vec<ChatTurn>, ChatError> {
        let models = chat_turns::Entity::find()
            .filter(chat_turns::Column::UserId.eq(owner_id.into_inner()))
            .filter(chat_turns::Column::SessionId.eq(session_id))
            .order_by_asc(chat_turns::Column::CreatedAt)
            .order_by_asc(chat_turns::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| ChatError::repository(e.to_string()))?;

        models
            .into_iter()
            .map(|m| turn_to_domain(m).map_err(ChatError::from))
            .collect()
    }

    async fn count_transactions(&self, owner_id: UserId, limit: u64) -> Result<u64, ChatError> {
        let count = TransactionRepository::new(self.db.clone())
            .count_for_owner(owner_id)
            .await?;
        Ok(count.min(limit))
    }

    async fn latest_tax_summary(&self, owner_id: UserId) -> Result<Option<TaxSummary>, ChatError> {
        Ok(TaxSummaryRepository::new(self.db.clone())
            .latest_for_owner(owner_id)
            .await?)
    }
}

fn turn_to_domain(model: chat_turns::Model) -> Result<ChatTurn, RepositoryError> {
    let role = model
        .role
        .parse::<ChatRole>()
        .map_err(|e| RepositoryError::corrupt("chat_turns", e))?;

    Ok(ChatTurn {
        id: ChatTurnId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.user_id),
        session_id: model.session_id,
        role,
        message: model.message,
        created_at: model.created_at.into(),
    })
}
