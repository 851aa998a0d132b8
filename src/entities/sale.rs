use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale entity. Rows are written once by sale registration and never updated;
/// prices and margin are frozen at insertion time so later product edits do
/// not rewrite history.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub product_id: Uuid,

    /// Units sold, always positive
    pub quantity: i32,

    /// Unit price actually charged (post-discount)
    pub sale_price: Decimal,

    /// Purchase price snapshot taken from the product at sale time
    pub purchase_price: Decimal,

    /// (sale_price - purchase_price) * quantity
    pub margin: Decimal,

    pub customer_name: Option<String>,

    pub sold_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
