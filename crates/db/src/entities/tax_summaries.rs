//! `SeaORM` Entity for tax_summaries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub upload_id: Uuid,
    #[sea_orm(column_type = "Decimal(None)")]
    pub total_income: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub total_expenses: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub estimated_turnover: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub gst_amount: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub itr_amount: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub tds_amount: Decimal,
    /// JSON array of five strings.
    #[sea_orm(column_type = "JsonBinary")]
    pub optimization_tips: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::uploads::Entity",
        from = "Column::UploadId",
        to = "super::uploads::Column::Id"
    )]
    Uploads,
}

impl Related<super::uploads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
