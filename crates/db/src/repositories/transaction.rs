//! Transaction repository for extracted statement lines.

use cognitax_core::statement::{Direction, Transaction};
use cognitax_shared::types::{TransactionId, UploadId, UserId};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::error::RepositoryError;
use crate::entities::transactions;

/// Largest number of transactions returned by a listing.
pub const TRANSACTION_LIST_LIMIT: u64 = 10_000;

/// Read access to stored transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's transactions in insertion order, optionally for one upload.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list_for_owner(
        &self,
        owner_id: UserId,
        upload_id: Option<UploadId>,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner_id.into_inner()));
        if let Some(upload_id) = upload_id {
            query = query.filter(transactions::Column::UploadId.eq(upload_id.into_inner()));
        }

        query
            .order_by_asc(transactions::Column::CreatedAt)
            .order_by_asc(transactions::Column::Id)
            .limit(TRANSACTION_LIST_LIMIT)
            .all(&self.db)
            .await?
            .into_iter()
            .map(transaction_to_domain)
            .collect()
    }

    /// Number of transactions a user has.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_for_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(owner_id.into_inner()))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}

/// Converts a stored row into a [`Transaction`].
fn transaction_to_domain(model: transactions::Model) -> Result<Transaction, RepositoryError> {
    let direction = model
        .direction
        .parse::<Direction>()
        .map_err(|e| RepositoryError::corrupt("transactions", e.to_string()))?;

    Ok(Transaction {
        id: TransactionId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.user_id),
        upload_id: UploadId::from_uuid(model.upload_id),
        date: model.transaction_date,
        description: model.description,
        amount: model.amount,
        direction,
        category: model.category,
        payment_mode: model.payment_mode,
        created_at: model.created_at.into(),
    })
}
