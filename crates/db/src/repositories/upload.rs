//! Upload repository: the persistence side of the ingestion pipeline.

use chrono::{DateTime, Utc};
use cognitax_core::ingestion::{
    IngestionError, IngestionRepository as IngestionRepoTrait, InvalidTransition, Upload,
    UploadCompletion, UploadStatus,
};
use cognitax_core::tax::TaxSummary;
use cognitax_shared::types::{UploadId, UserId};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use super::error::RepositoryError;
use super::tax_summary::summary_to_domain;
use crate::entities::{tax_summaries, transactions, uploads};

/// Largest number of uploads returned by a listing.
pub const UPLOAD_LIST_LIMIT: u64 = 100;

/// Rows per transaction `INSERT`. Postgres caps one statement at 65,535
/// bind parameters.
pub const TRANSACTION_INSERT_BATCH: usize = 1_000;

const POSTGRES_MAX_BIND_PARAMS: usize = 65_535;

const _: () = assert!(TRANSACTION_INSERT_BATCH * 10 <= POSTGRES_MAX_BIND_PARAMS);

/// Upload repository implementation.
#[derive(Debug, Clone)]
pub struct UploadRepository {
    db: DatabaseConnection,
}

impl UploadRepository {
    /// Create a new upload repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's uploads, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list_for_owner(&self, owner_id: UserId) -> Result<Vec<Upload>, RepositoryError> {
        let models = uploads::Entity::find()
            .filter(uploads::Column::UserId.eq(owner_id.into_inner()))
            .order_by_desc(uploads::Column::CreatedAt)
            .limit(UPLOAD_LIST_LIMIT)
            .all(&self.db)
            .await?;

        models.into_iter().map(upload_to_domain).collect()
    }

    /// Finds one of a user's uploads.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub async fn find(
        &self,
        owner_id: UserId,
        upload_id: UploadId,
    ) -> Result<Option<Upload>, RepositoryError> {
        uploads::Entity::find_by_id(upload_id.into_inner())
            .filter(uploads::Column::UserId.eq(owner_id.into_inner()))
            .one(&self.db)
            .await?
            .map(upload_to_domain)
            .transpose()
    }

    /// Builds the error for a transition the conditional update refused.
    async fn rejected(&self, upload_id: UploadId, to: UploadStatus) -> IngestionError {
        match uploads::Entity::find_by_id(upload_id.into_inner())
            .one(&self.db)
            .await
        {
            Ok(Some(model)) => match model.status.parse::<UploadStatus>() {
                Ok(from) => IngestionError::InvalidTransition {
                    upload_id,
                    source: InvalidTransition { from, to },
                },
                Err(e) => IngestionError::repository(e),
            },
            Ok(None) => IngestionError::NotFound(upload_id),
            Err(e) => IngestionError::repository(e.to_string()),
        }
    }
}

fn db_err(e: impl std::fmt::Display) -> IngestionError {
    IngestionError::repository(e.to_string())
}

impl IngestionRepoTrait for UploadRepository {
    async fn create_upload(&self, upload: &Upload) -> Result<(), IngestionError> {
        let created_at = upload.created_at.into();
        uploads::ActiveModel {
            id: Set(upload.id.into_inner()),
            user_id: Set(upload.owner_id.into_inner()),
            filename: Set(upload.filename.clone()),
            byte_size: Set(upload.byte_size),
            bank_name: Set(upload.bank_name.clone()),
            statement_period: Set(upload.statement_period.clone()),
            status: Set(upload.status.as_str().to_string()),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn complete_upload(
        &self,
        completion: UploadCompletion,
    ) -> Result<TaxSummary, IngestionError> {
        let upload_id = completion.upload_id;
        let owner = completion.owner_id.into_inner();
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(db_err)?;

        let result = uploads::Entity::update_many()
            .col_expr(
                uploads::Column::Status,
                Expr::value(UploadStatus::Completed.as_str()),
            )
            .col_expr(uploads::Column::BankName, Expr::value(completion.bank_name))
            .col_expr(
                uploads::Column::StatementPeriod,
                Expr::value(completion.statement_period),
            )
            .col_expr(uploads::Column::UpdatedAt, Expr::value(now))
            .filter(uploads::Column::Id.eq(upload_id.into_inner()))
            .filter(uploads::Column::Status.eq(UploadStatus::Processing.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(self.rejected(upload_id, UploadStatus::Completed).await);
        }

        let count = completion.transactions.len();
        let rows = completion
            .transactions
            .into_iter()
            .map(|t| transactions::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(owner),
                upload_id: Set(upload_id.into_inner()),
                transaction_date: Set(t.date),
                description: Set(t.description),
                amount: Set(t.amount),
                direction: Set(t.direction.as_str().to_string()),
                category: Set(t.category),
                payment_mode: Set(t.payment_mode),
                created_at: Set(now.into()),
            });
        for batch in batches(rows, TRANSACTION_INSERT_BATCH) {
            transactions::Entity::insert_many(batch)
                .exec_without_returning(&txn)
                .await
                .map_err(db_err)?;
        }

        let tax = completion.tax_summary.computation;
        let summary = tax_summaries::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(owner),
            upload_id: Set(upload_id.into_inner()),
            total_income: Set(tax.total_income),
            total_expenses: Set(tax.total_expenses),
            estimated_turnover: Set(tax.estimated_turnover),
            gst_amount: Set(tax.gst_amount),
            itr_amount: Set(tax.itr_amount),
            tds_amount: Set(tax.tds_amount),
            optimization_tips: Set(serde_json::Value::from(
                completion.tax_summary.optimization_tips,
            )),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(%upload_id, transactions = count, "Upload committed");

        summary_to_domain(summary).map_err(IngestionError::from)
    }

    async fn mark_failed(&self, upload_id: UploadId) -> Result<(), IngestionError> {
        let result = uploads::Entity::update_many()
            .col_expr(
                uploads::Column::Status,
                Expr::value(UploadStatus::Failed.as_str()),
            )
            .col_expr(uploads::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(uploads::Column::Id.eq(upload_id.into_inner()))
            .filter(uploads::Column::Status.eq(UploadStatus::Processing.as_str()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(self.rejected(upload_id, UploadStatus::Failed).await);
        }
        Ok(())
    }

    async fn fail_stale_uploads(&self, cutoff: DateTime<Utc>) -> Result<u64, IngestionError> {
        let result = uploads::Entity::update_many()
            .col_expr(
                uploads::Column::Status,
                Expr::value(UploadStatus::Failed.as_str()),
            )
            .col_expr(uploads::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(uploads::Column::Status.eq(UploadStatus::Processing.as_str()))
            .filter(uploads::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected)
    }
}

/// Splits `items` into consecutive batches of at most `size`.
fn batches<T>(items: impl IntoIterator<Item = T>, size: usize) -> impl Iterator<Item = Vec<T>> {
    let mut items = items.into_iter();
    std::iter::from_fn(move || {
        let batch: Vec<T> = items.by_ref().take(size).collect();
        (!batch.is_empty()).then_some(batch)
    })
}

/// Converts a stored row into an [`Upload`].
pub(crate) fn upload_to_domain(model: uploads::Model) -> Result<Upload, RepositoryError> {
    let status = model
        .status
        .parse::<UploadStatus>()
        .map_err(|e| RepositoryError::corrupt("uploads", e))?;

    Ok(Upload {
        id: UploadId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.user_id),
        filename: model.filename,
        byte_size: model.byte_size,
        bank_name: model.bank_name,
        statement_period: model.statement_period,
        status,
        created_at: model.created_at.into(),
    })
}
