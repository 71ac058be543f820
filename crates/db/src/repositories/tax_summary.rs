//! Tax summary repository.

use cognitax_core::tax::TaxSummary;
use cognitax_shared::types::{TaxSummaryId, UploadId, UserId};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::error::RepositoryError;
use crate::entities::tax_summaries;

/// Largest number of summaries returned by a listing.
pub const TAX_SUMMARY_LIST_LIMIT: u64 = 100;

/// Read access to stored tax summaries.
#[derive(Debug, Clone)]
pub struct TaxSummaryRepository {
    db: DatabaseConnection,
}

impl TaxSummaryRepository {
    /// Create a new tax summary repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row is corrupt.
    pub async fn list_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<TaxSummary>, RepositoryError> {
        tax_summaries::Entity::find()
            .filter(tax_summaries::Column::UserId.eq(owner_id.into_inner()))
            .order_by_desc(tax_summaries::Column::CreatedAt)
            .limit(TAX_SUMMARY_LIST_LIMIT)
            .all(&self.db)
            .await?
            .into_iter()
            .map(summary_to_domain)
            .collect()
    }

    /// The user's most recent summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row is corrupt.
    pub async fn latest_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<TaxSummary>, RepositoryError> {
        tax_summaries::Entity::find()
            .filter(tax_summaries::Column::UserId.eq(owner_id.into_inner()))
            .order_by_desc(tax_summaries::Column::CreatedAt)
            .one(&self.db)
            .await?
            .map(summary_to_domain)
            .transpose()
    }
}

/// Converts a stored row into a [`TaxSummary`].
pub(crate) fn summary_to_domain(model: tax_summaries::Model) -> Result<TaxSummary, RepositoryError> {
    let optimization_tips: Vec<String> = serde_json::from_value(model.optimization_tips)
        .map_err(|e| RepositoryError::corrupt("tax_summaries", e.to_string()))?;

    Ok(TaxSummary {
        id: TaxSummaryId::from_uuid(model.id),
        owner_id: UserId::from_uuid(model.user_id),
        upload_id: UploadId::from_uuid(model.upload_id),
        total_income: model.total_income,
        total_expenses: model.total_expenses,
        estimated_turnover: model.estimated_turnover,
        gst_amount: model.gst_amount,
        itr_amount: model.itr_amount,
        tds_amount: model.tds_amount,
        optimization_tips,
        created_at: model.created_at.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use uuid::Uuid;

    fn model(tips: serde_json::Value) -> tax_summaries::Model {
        tax_summaries::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            upload_id: Uuid::now_v7(),
            total_income: dec!(2500000),
            total_expenses: dec!(200000),
            estimated_turnover: dec!(2500000),
            gst_amount: dec!(450000),
            itr_amount: dec!(615000),
            tds_amount: dec!(0),
            optimization_tips: tips,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_summary_to_domain() {
        let summary = summary_to_domain(model(json!(["a", "b", "c", "d", "e"]))).unwrap();
        assert_eq!(summary.optimization_tips, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(summary.computation().gst_amount, dec!(450000));
    }

    #[test]
    fn test_non_array_tips_are_corrupt() {
        let err = summary_to_domain(model(json!({"tip": "a"}))).unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt { table: "tax_summaries", .. }));
    }
}
