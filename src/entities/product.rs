use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    /// Product description
    #[validate(length(max = 2000, message = "Description cannot exceed 2000 characters"))]
    pub description: Option<String>,

    /// Unit cost paid to the supplier
    #[validate(custom = "validate_non_negative")]
    pub purchase_price: Decimal,

    /// Listed unit price before any discount
    #[validate(custom = "validate_non_negative")]
    pub sale_price: Decimal,

    /// Discount percentage, applied only while `discount_active` is set
    #[validate(custom = "validate_percent")]
    pub discount_percent: Decimal,

    /// Whether the discount is currently applied
    pub discount_active: bool,

    /// Units on hand; sales decrement this and it never goes negative
    pub stock: i32,

    /// URL to the product image in object storage
    pub image_url: Option<String>,

    /// Optional category reference
    pub category_id: Option<Uuid>,

    /// Soft-delete flag; inactive products stay referenced by past sales
    pub active: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Unit price actually charged: the listed sale price reduced by the
    /// discount percentage iff the discount is active and greater than zero.
    pub fn effective_unit_price(&self) -> Decimal {
        if self.discount_active && self.discount_percent > Decimal::ZERO {
            self.sale_price * (Decimal::ONE - self.discount_percent / Decimal::from(100))
        } else {
            self.sale_price
        }
    }
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    Ok(())
}

fn validate_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(100) {
        return Err(ValidationError::new("percent_out_of_range"));
    }
    Ok(())
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(has_many = "super::sale::Entity")]
    Sales,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::sale::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sales.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.active {
                active_model.active = Set(true);
            }
            if let ActiveValue::NotSet = active_model.discount_active {
                active_model.discount_active = Set(false);
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);

        let model: Model = active_model.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(sale_price: Decimal, percent: Decimal, active: bool) -> Model {
        Model {
            id: Uuid::new_v4(),
            name: "Eau de Test".to_string(),
            description: None,
            purchase_price: dec!(10),
            sale_price,
            discount_percent: percent,
            discount_active: active,
            stock: 5,
            image_url: None,
            category_id: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn effective_price_applies_active_discount() {
        let p = product(dec!(20), dec!(25), true);
        assert_eq!(p.effective_unit_price(), dec!(15.00));
    }

    #[test]
    fn effective_price_ignores_inactive_discount() {
        let p = product(dec!(20), dec!(25), false);
        assert_eq!(p.effective_unit_price(), dec!(20));
    }

    #[test]
    fn effective_price_ignores_zero_percent() {
        let p = product(dec!(20), Decimal::ZERO, true);
        assert_eq!(p.effective_unit_price(), dec!(20));
    }
}
